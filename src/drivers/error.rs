use std::io;
use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial channel failed: {0}")]
    Channel(#[source] io::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("input has no header row")]
    MissingHeader,
    #[error("expected at least 2 columns, found {found}")]
    TooFewColumns { found: usize },
    #[error("{} is a recorded file, not a live source", .0.display())]
    NotLive(PathBuf),
    #[error("window size must be greater than zero")]
    InvalidWindowSize,
    #[error("unsupported image format for {0}")]
    UnsupportedImageFormat(PathBuf),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DashboardError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DashboardError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for DashboardError {
    fn from(value: image::ImageError) -> Self {
        DashboardError::Plot(value.to_string())
    }
}
