use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::{
    config::ReportConfig,
    dataset::Dataset,
    histogram::LogHistogram,
    plot::{HistogramJob, render_histogram},
};

/// Renders the histogram of a single variant and returns the written file.
pub fn generate_report(dataset: &Dataset, config: &ReportConfig, variant: &str) -> Result<PathBuf> {
    let durations = dataset.durations_us(variant);
    let histogram = LogHistogram::from_values(&durations, config.bins).wrap_err_with(|| {
        format!(
            "Bin durations of variant {variant} (variants present: {})",
            dataset.variants().join(", ")
        )
    })?;
    info!(
        "{variant}: {} samples, log bins from {:.3} µs to {:.3} µs",
        durations.len(),
        histogram.edges[0],
        histogram.edges[histogram.bins()]
    );

    let filepath = config.output_path(variant);
    render_histogram(&HistogramJob {
        filepath: filepath.clone(),
        histogram: &histogram,
        title: &config.title,
        x_label: &config.x_label,
        y_label: &config.y_label,
        font_family: &config.font_family,
        x_range: config.x_range,
        size: config.size,
    })
    .wrap_err_with(|| format!("Plot variant {variant}"))?;

    info!("Wrote {filepath:?}");
    Ok(filepath)
}

/// Renders every configured variant in order, stopping at the first failure.
///
/// Files written before a failure are left in place.
pub fn generate_reports(dataset: &Dataset, config: &ReportConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(config.variants.len());
    for variant in &config.variants {
        written.push(generate_report(dataset, config, variant)?);
    }
    Ok(written)
}

/// Loads `stats_path` and renders every configured variant.
pub fn run(stats_path: &Path, config: &ReportConfig) -> Result<Vec<PathBuf>> {
    let dataset = Dataset::from_csv(stats_path)
        .wrap_err_with(|| format!("Read stats file {stats_path:?}"))?;
    debug!("Variants present: {:?}", dataset.variants());
    generate_reports(&dataset, config)
}
