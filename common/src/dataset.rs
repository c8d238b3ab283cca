use std::{fs::File, io::Read, path::Path};

use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::NS_PER_US;

pub const VARIANT_COLUMN: &str = "variant";
pub const DURATION_COLUMN: &str = "duration_ns";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Open failed: {0}")]
    Open(#[from] std::io::Error),
    #[error("Missing column {column}")]
    MissingColumn { column: &'static str },
    #[error("Parse error: {0}")]
    Parse(#[from] csv::Error),
}

/// A single timing row of the stats file.
///
/// The stats writer emits `commit_id,file,variant,N,M,D,duration_ns`; only
/// the columns needed for plotting are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurement {
    pub variant: String,
    pub duration_ns: f64,
}

impl Measurement {
    pub fn duration_us(&self) -> f64 {
        self.duration_ns / NS_PER_US
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub measurements: Vec<Measurement>,
}

impl Dataset {
    pub fn from_csv(path: &Path) -> Result<Self, DatasetError> {
        debug!("Reading measurements from {path:?}");
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_reader(reader);

        // Checked up front so a header-only file still reports the missing column
        let headers = reader.headers()?;
        for column in [VARIANT_COLUMN, DURATION_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(DatasetError::MissingColumn { column });
            }
        }

        let measurements = reader
            .deserialize::<Measurement>()
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} measurements", measurements.len());
        Ok(Self { measurements })
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Distinct variant labels in the order they first appear.
    pub fn variants(&self) -> Vec<&str> {
        self.measurements
            .iter()
            .map(|m| m.variant.as_str())
            .unique()
            .collect()
    }

    /// Durations in µs of every row tagged with `variant`.
    pub fn durations_us(&self, variant: &str) -> Vec<f64> {
        self.measurements
            .iter()
            .filter(|m| m.variant == variant)
            .map(Measurement::duration_us)
            .collect()
    }
}
