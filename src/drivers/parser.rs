use thiserror::Error;
use crate::drivers::{DashboardError, Sample};
/// Placeholder the firmware prints when no pulse has been detected yet.
pub const MISSING_HEART_RATE: &str = "N/A";
/// Why a raw record did not produce a [`Sample`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("empty line")]
    Empty,
    #[error("header line")]
    Header,
    #[error("expected at least 3 fields, found {0}")]
    TooFewFields(usize),
    #[error("row has no cell for column {0}")]
    MissingCell(usize),
    #[error("time {0:?} is not a number")]
    InvalidTime(String),
    #[error("temperature {0:?} is not a number")]
    InvalidTemperature(String),
    #[error("heart rate {0:?} is not a number")]
    InvalidHeartRate(String),
}
fn parse_number(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok()
}
fn is_missing_heart_rate(token: &str) -> bool {
    token.is_empty() || token.eq_ignore_ascii_case(MISSING_HEART_RATE)
}
/// Parses one `time,temperature,heart-rate` line as printed by the device.
///
/// Blank lines, the device's own header line and anything with fewer than
/// three fields are rejected. An unparsable heart-rate rejects the whole
/// line, while `N/A` or an empty field simply leaves it absent.
pub fn parse_line(line: &str) -> Result<Sample, Rejection> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Rejection::Empty);
    }
    if line
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("time"))
    {
        return Err(Rejection::Header);
    }
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return Err(Rejection::TooFewFields(parts.len()));
    }
    let time = parse_number(parts[0]).ok_or_else(|| Rejection::InvalidTime(parts[0].into()))?;
    let temperature =
        parse_number(parts[1]).ok_or_else(|| Rejection::InvalidTemperature(parts[1].into()))?;
    let heart_rate = if is_missing_heart_rate(parts[2]) {
        None
    } else {
        Some(parse_number(parts[2]).ok_or_else(|| Rejection::InvalidHeartRate(parts[2].into()))?)
    };
    Ok(Sample::new(time, temperature, heart_rate))
}
/// Column positions of the three logical fields inside a tabular file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub time: usize,
    pub temperature: usize,
    /// `None` when the file has fewer than three columns.
    pub heart_rate: Option<usize>,
}
impl ColumnMap {
    /// Resolves columns by name (case-insensitive), falling back to position.
    pub fn resolve(headers: &[String]) -> Result<Self, DashboardError> {
        if headers.len() < 2 {
            return Err(DashboardError::TooFewColumns {
                found: headers.len(),
            });
        }
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| lowered.iter().position(|h| h == name);
        let time = find("time(s)").or_else(|| find("time")).unwrap_or(0);
        let temperature = find("temp(°c)").or_else(|| find("temp")).unwrap_or(1);
        let heart_rate = if headers.len() >= 3 {
            Some(find("bpm").unwrap_or(2))
        } else {
            None
        };
        Ok(Self {
            time,
            temperature,
            heart_rate,
        })
    }
}
/// Converts one data row using the resolved columns.
///
/// Unlike [`parse_line`], a heart-rate cell that is not a number is coerced
/// to absent rather than rejecting the row.
pub fn parse_row(columns: &ColumnMap, cells: &[String]) -> Result<Sample, Rejection> {
    let cell = |idx: usize| {
        cells
            .get(idx)
            .map(|c| c.trim())
            .ok_or(Rejection::MissingCell(idx))
    };
    let time_raw = cell(columns.time)?;
    let time = parse_number(time_raw).ok_or_else(|| Rejection::InvalidTime(time_raw.into()))?;
    let temp_raw = cell(columns.temperature)?;
    let temperature =
        parse_number(temp_raw).ok_or_else(|| Rejection::InvalidTemperature(temp_raw.into()))?;
    let heart_rate = columns
        .heart_rate
        .and_then(|idx| cells.get(idx))
        .and_then(|c| parse_number(c))
        .filter(|v| !v.is_nan());
    Ok(Sample::new(time, temperature, heart_rate))
}
