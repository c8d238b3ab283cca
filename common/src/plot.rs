use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use plotters::{prelude::*, style::register_font};
use thiserror::Error;
use tracing::debug;

use crate::histogram::LogHistogram;

/// Family name the bundled DejaVu Sans is registered under.
pub const FONT_FAMILY: &str = "sans-serif";

static DEJAVU_SANS: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");

static FONT_REGISTERED: LazyLock<Result<(), String>> = LazyLock::new(|| {
    register_font(FONT_FAMILY, FontStyle::Normal, DEJAVU_SANS)
        .map_err(|_| "Register bundled font: InvalidFont".to_string())
});

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Rendering {path:?} failed: {msg}")]
    Render { path: PathBuf, msg: String },
}

fn render_error(path: &Path, err: impl Display) -> PlotError {
    PlotError::Render {
        path: path.to_path_buf(),
        msg: err.to_string(),
    }
}

/// One histogram figure, written as a PNG to `filepath`.
#[derive(Debug, Clone)]
pub struct HistogramJob<'a> {
    pub filepath: PathBuf,
    pub histogram: &'a LogHistogram,
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub font_family: &'a str,
    /// Fixed limits of the logarithmic x axis
    pub x_range: (f64, f64),
    pub size: (u32, u32),
}

/// Draws the histogram bars on a log-scaled x axis.
///
/// The figure is drawn into memory and only written to `filepath` once
/// drawing and encoding succeeded, so a failed render leaves whatever was
/// at the path untouched. Bars outside `x_range` are clipped to it.
pub fn render_histogram(job: &HistogramJob<'_>) -> Result<(), PlotError> {
    let path = job.filepath.as_path();
    let (x_min, x_max) = job.x_range;
    if !(x_min > 0.0 && x_max > x_min) {
        return Err(render_error(
            path,
            format!("invalid x range [{x_min}, {x_max}]"),
        ));
    }
    FONT_REGISTERED
        .clone()
        .map_err(|e| render_error(path, e))?;

    let (width, height) = job.size;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    draw(job, &mut pixels).map_err(|e| render_error(path, e))?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| render_error(path, e))?;
    fs::write(path, png).map_err(|e| render_error(path, e))?;

    debug!("Rendered {path:?}");
    Ok(())
}

/// Draws the figure into an RGB buffer of `job.size`.
fn draw(job: &HistogramJob<'_>, pixels: &mut [u8]) -> Result<(), String> {
    let (x_min, x_max) = job.x_range;
    let y_max = (job.histogram.max_count() as f64 * 1.05).max(1.0);

    let root = BitMapBackend::with_buffer(pixels, job.size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .caption(job.title, (job.font_family, 22))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d((x_min..x_max).log_scale(), 0f64..y_max)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .label_style((job.font_family, 14))
        .axis_desc_style((job.font_family, 16))
        .x_desc(job.x_label)
        .y_desc(job.y_label)
        .x_label_formatter(&|v| format!("{v:e}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()
        .map_err(|e| e.to_string())?;

    let bars = job
        .histogram
        .iter_bins()
        .filter(|(lo, hi, count)| *count > 0 && *hi > x_min && *lo < x_max)
        .map(|(lo, hi, count)| {
            Rectangle::new(
                [(lo.max(x_min), 0.0), (hi.min(x_max), count as f64)],
                BAR_COLOR.filled(),
            )
        });
    chart.draw_series(bars).map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn job<'a>(filepath: PathBuf, histogram: &'a LogHistogram) -> HistogramJob<'a> {
        HistogramJob {
            filepath,
            histogram,
            title: "textdiff.Unified(...) for Go repository",
            x_label: "µs",
            y_label: "Frequency",
            font_family: FONT_FAMILY,
            x_range: (1.0, 1_000_000.0),
            size: (800, 600),
        }
    }

    fn png_dimensions(data: &[u8]) -> (u32, u32) {
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes(data[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(data[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn writes_png_of_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let hist = LogHistogram::from_values(&[2.0, 30.0, 30.0, 450.0, 12_000.0], 100).unwrap();
        let path = dir.path().join("hist.png");

        render_histogram(&job(path.clone(), &hist)).unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(png_dimensions(&data), (800, 600));
    }

    #[test]
    fn clips_bars_outside_axis_limits() {
        let dir = tempfile::tempdir().unwrap();
        // Spans below 1 µs, partly outside the fixed axis
        let hist = LogHistogram::from_values(&[0.01, 0.2, 5.0], 100).unwrap();
        let path = dir.path().join("clipped.png");

        render_histogram(&job(path.clone(), &hist)).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let hist = LogHistogram::from_values(&[2.0, 3.0], 100).unwrap();
        let path = dir.path().join("missing").join("hist.png");

        let PlotError::Render { path: failed, .. } =
            render_histogram(&job(path.clone(), &hist)).unwrap_err();
        assert_eq!(failed, path);
    }

    #[test]
    fn rejects_non_positive_axis() {
        let dir = tempfile::tempdir().unwrap();
        let hist = LogHistogram::from_values(&[2.0, 3.0], 100).unwrap();
        let mut bad = job(dir.path().join("hist.png"), &hist);
        bad.x_range = (0.0, 10.0);

        assert!(render_histogram(&bad).is_err());
        assert!(!dir.path().join("hist.png").exists());
    }

    #[test]
    fn failed_render_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let hist = LogHistogram::from_values(&[2.0, 3.0], 100).unwrap();
        let path = dir.path().join("hist.png");
        let mut bad = job(path.clone(), &hist);
        bad.font_family = "no-such-family";

        assert!(render_histogram(&bad).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn failed_render_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let hist = LogHistogram::from_values(&[2.0, 3.0, 40.0], 100).unwrap();
        let path = dir.path().join("hist.png");
        render_histogram(&job(path.clone(), &hist)).unwrap();
        let before = fs::read(&path).unwrap();

        let mut bad = job(path.clone(), &hist);
        bad.font_family = "no-such-family";
        assert!(render_histogram(&bad).is_err());

        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
