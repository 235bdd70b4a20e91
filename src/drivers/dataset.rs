use std::path::Path;
use log::{debug, warn};
use crate::drivers::parser::{parse_row, ColumnMap};
use crate::drivers::source::TabularFile;
use crate::drivers::{DashboardError, Sample};
/// Every sample of a recorded file, loaded once.
#[derive(Clone, Debug)]
pub struct Dataset {
    samples: Vec<Sample>,
    columns: ColumnMap,
    rejected: usize,
}
impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let table = TabularFile::open(path)?;
        let dataset = Self::from_table(&table)?;
        if table.is_empty() {
            warn!("{} has a header but no data rows", path.display());
        }
        Ok(dataset)
    }
    pub fn from_table(table: &TabularFile) -> Result<Self, DashboardError> {
        let columns = ColumnMap::resolve(table.headers())?;
        let mut samples = Vec::with_capacity(table.len());
        let mut rejected = 0;
        for (idx, row) in table.rows().enumerate() {
            match parse_row(&columns, row) {
                Ok(sample) => samples.push(sample),
                Err(reason) => {
                    rejected += 1;
                    debug!("skipping data row {}: {reason}", idx + 1);
                }
            }
        }
        Ok(Self {
            samples,
            columns,
            rejected,
        })
    }
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    pub fn columns(&self) -> ColumnMap {
        self.columns
    }
    /// Rows dropped because time or temperature did not parse.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    #[test]
    fn loads_file_with_comments_and_missing_pulse() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# Arduino health monitor").unwrap();
        writeln!(file, "Time(s),Temp(°C),BPM").unwrap();
        writeln!(file, "0.5,36.4,N/A").unwrap();
        writeln!(file, "1.0,36.5,71").unwrap();
        writeln!(file, "oops,36.5,71").unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(
            dataset.samples(),
            [
                Sample::new(0.5, 36.4, None),
                Sample::new(1.0, 36.5, Some(71.0)),
            ]
        );
        assert_eq!(dataset.rejected(), 1);
    }
    #[test]
    fn columns_are_matched_by_name() {
        let table = TabularFile::parse("Temp,Time(s),BPM\n22.5,1.0,72\n22.7,2.0,N/A\n").unwrap();
        let dataset = Dataset::from_table(&table).unwrap();
        assert_eq!(
            dataset.samples(),
            [
                Sample::new(1.0, 22.5, Some(72.0)),
                Sample::new(2.0, 22.7, None),
            ]
        );
    }
    #[test]
    fn two_column_file_has_no_heart_rate() {
        let table = TabularFile::parse("time,temp\n1,20\n2,21\n").unwrap();
        let dataset = Dataset::from_table(&table).unwrap();
        assert_eq!(dataset.columns().heart_rate, None);
        assert!(dataset.samples().iter().all(|s| s.heart_rate.is_none()));
    }
    #[test]
    fn unreadable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = Dataset::load(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(DashboardError::Read { .. })));
    }
}
