use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use log::info;
use crate::drivers::parser::MISSING_HEART_RATE;
use crate::drivers::{save_dashboard, DashboardError, DashboardSeries, PlotStyle, Sample};
use crate::types::SnapshotPaths;
pub const CSV_HEADER: &str = "Time(s),Temp(C),BPM";
pub const PLOT_SUFFIX: &str = "_plot.png";
/// Chart image saved next to a CSV snapshot: `<dir>/<stem>_plot.png`.
pub fn plot_path_for(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    csv_path.with_file_name(format!("{stem}{PLOT_SUFFIX}"))
}
fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
/// Writes samples as `Time(s),Temp(C),BPM` rows; absent pulse is `N/A`.
pub fn write_csv<W: Write>(writer: W, samples: &[Sample]) -> io::Result<()> {
    let mut w = BufWriter::new(writer);
    writeln!(w, "{CSV_HEADER}")?;
    for sample in samples {
        let bpm = sample
            .heart_rate
            .map(format_value)
            .unwrap_or_else(|| MISSING_HEART_RATE.to_string());
        writeln!(
            w,
            "{},{},{}",
            format_value(sample.time),
            format_value(sample.temperature),
            bpm
        )?;
    }
    w.flush()
}
/// Persists the end-of-run state of a live session.
pub struct SnapshotWriter {
    csv_path: PathBuf,
    image_path: PathBuf,
    style: PlotStyle,
}
impl SnapshotWriter {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        let csv_path = csv_path.into();
        Self {
            image_path: plot_path_for(&csv_path),
            csv_path,
            style: PlotStyle::default(),
        }
    }
    pub fn save(&self, samples: &[Sample]) -> Result<SnapshotPaths, DashboardError> {
        info!("Saving last data to {}", self.csv_path.display());
        let write_err = |source| DashboardError::Write {
            path: self.csv_path.clone(),
            source,
        };
        let file = File::create(&self.csv_path).map_err(write_err)?;
        write_csv(file, samples).map_err(write_err)?;
        save_dashboard(
            &DashboardSeries::from_samples(samples),
            &self.image_path,
            &self.style,
        )?;
        info!("Saved plot to {}", self.image_path.display());
        Ok(SnapshotPaths {
            csv: self.csv_path.clone(),
            image: self.image_path.clone(),
        })
    }
}
