use std::path::PathBuf;

use crate::plot::FONT_FAMILY;

pub const DEFAULT_VARIANTS: &[&str] = &["regular", "anchoring", "optimal"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Variants to plot, in the order they are rendered
    pub variants: Vec<String>,
    pub bins: usize,
    /// Fixed x axis limits in µs
    pub x_range: (f64, f64),
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Must name a family registered with plotters
    pub font_family: String,
    /// Output files are named `<file_prefix>_<variant>.png`
    pub file_prefix: String,
    pub output_dir: PathBuf,
    /// Image size in pixels
    pub size: (u32, u32),
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            variants: DEFAULT_VARIANTS.iter().map(|v| v.to_string()).collect(),
            bins: 100,
            x_range: (1.0, 1_000_000.0),
            title: "textdiff.Unified(...) for Go repository".to_owned(),
            x_label: "µs".to_owned(),
            y_label: "Frequency".to_owned(),
            font_family: FONT_FAMILY.to_owned(),
            file_prefix: "perf_go_repo".to_owned(),
            output_dir: PathBuf::from("."),
            size: (800, 600),
        }
    }
}

impl ReportConfig {
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_path(&self, variant: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{variant}.png", self.file_prefix))
    }
}
