#[cfg(test)]
use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::thread;
use std::time::Duration;
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serialport::SerialPort;
use crate::drivers::DashboardError;
/// Result of asking a live source for its next line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Nothing complete arrived before the read timeout.
    TimedOut,
    /// The source has no more data.
    Closed,
}
/// Trait representing something that can yield raw text records on demand.
pub trait LineSource {
    fn next_line(&mut self) -> Result<ReadOutcome, DashboardError>;
}
impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<ReadOutcome, DashboardError> {
        (**self).next_line()
    }
}
/// Splits any byte stream into newline-terminated lines.
///
/// A line cut short by a read timeout stays buffered and is completed by the
/// following reads.
pub struct StreamLineSource<R: Read> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}
impl<R: Read> StreamLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: Vec::new(),
        }
    }
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }
    fn take_pending(&mut self) -> String {
        let line = decode_line(&self.pending);
        self.pending.clear();
        line
    }
}
impl<R: Read> LineSource for StreamLineSource<R> {
    fn next_line(&mut self) -> Result<ReadOutcome, DashboardError> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Ok(ReadOutcome::Closed),
            // Either a full line or the unterminated tail before EOF.
            Ok(_) => Ok(ReadOutcome::Line(self.take_pending())),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(ReadOutcome::TimedOut)
            }
            Err(e) => Err(DashboardError::Channel(e)),
        }
    }
}
/// Decodes device output as UTF-8, dropping bytes that are not valid.
fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}
/// Owned serial port handle. The port is released when this is dropped.
pub struct SerialChannel {
    name: String,
    port: Box<dyn SerialPort>,
}
impl SerialChannel {
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}
impl Drop for SerialChannel {
    fn drop(&mut self) {
        debug!("closing serial port {}", self.name);
    }
}
pub type SerialLineSource = StreamLineSource<SerialChannel>;
/// Opens `name` at `baud` and waits `boot_delay` for the board to come out of
/// its reset before any read.
pub fn open_serial(
    name: &str,
    baud: u32,
    read_timeout: Duration,
    boot_delay: Duration,
) -> Result<SerialLineSource, DashboardError> {
    let port = serialport::new(name, baud)
        .timeout(read_timeout)
        .open()
        .map_err(|source| DashboardError::Open {
            port: name.to_string(),
            source,
        })?;
    info!("opened {name} at {baud} baud");
    thread::sleep(boot_delay);
    Ok(StreamLineSource::new(SerialChannel {
        name: name.to_string(),
        port,
    }))
}
/// In-memory source for deterministic playback in tests.
#[cfg(test)]
pub struct ManualSource {
    queue: VecDeque<ReadOutcome>,
}
#[cfg(test)]
impl ManualSource {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            queue: lines
                .into_iter()
                .map(|l| ReadOutcome::Line(l.into()))
                .collect(),
        }
    }
    /// Same as [`ManualSource::new`] but with explicit outcomes, e.g. timeouts.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            queue: outcomes.into_iter().collect(),
        }
    }
}
#[cfg(test)]
impl LineSource for ManualSource {
    fn next_line(&mut self) -> Result<ReadOutcome, DashboardError> {
        Ok(self.queue.pop_front().unwrap_or(ReadOutcome::Closed))
    }
}
/// Stand-in for the sensor board: emits the same text protocol with a
/// drifting temperature and pulse, and an occasional missing pulse reading.
pub struct SimulatedSource {
    rng: StdRng,
    period: Duration,
    elapsed: f64,
    temperature: f64,
    heart_rate: f64,
    sent_header: bool,
}
impl SimulatedSource {
    pub fn new(period: Duration) -> Self {
        Self::with_rng(period, StdRng::from_entropy())
    }
    pub fn with_seed(period: Duration, seed: u64) -> Self {
        Self::with_rng(period, StdRng::seed_from_u64(seed))
    }
    fn with_rng(period: Duration, rng: StdRng) -> Self {
        Self {
            rng,
            period,
            elapsed: 0.0,
            temperature: 36.6,
            heart_rate: 72.0,
            sent_header: false,
        }
    }
}
impl LineSource for SimulatedSource {
    fn next_line(&mut self) -> Result<ReadOutcome, DashboardError> {
        if !self.sent_header {
            self.sent_header = true;
            return Ok(ReadOutcome::Line("Time(s),Temp(C),BPM".into()));
        }
        thread::sleep(self.period);
        self.elapsed += self.period.as_secs_f64();
        self.temperature = (self.temperature + self.rng.gen_range(-0.05..0.05)).clamp(35.5, 38.5);
        self.heart_rate = (self.heart_rate + self.rng.gen_range(-2.0..2.0)).clamp(50.0, 120.0);
        let bpm = if self.rng.gen_bool(0.1) {
            "N/A".to_string()
        } else {
            format!("{:.0}", self.heart_rate)
        };
        Ok(ReadOutcome::Line(format!(
            "{:.2},{:.2},{}",
            self.elapsed, self.temperature, bpm
        )))
    }
}
/// A whole tabular file held in memory: one header row plus data rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabularFile {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}
impl TabularFile {
    pub const COMMENT_MARKER: u8 = b'#';
    pub fn open(path: &Path) -> Result<Self, DashboardError> {
        let bytes = fs::read(path).map_err(|source| DashboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(bytes.as_slice())
    }
    pub fn parse(text: &str) -> Result<Self, DashboardError> {
        Self::from_reader(text.as_bytes())
    }
    /// Comment lines and blank records are skipped; the first remaining
    /// record is the header. Rows may be ragged.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DashboardError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(Self::COMMENT_MARKER))
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        for record in reader.byte_records() {
            let cells: Vec<String> = record?
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect();
            if cells.iter().all(String::is_empty) {
                continue;
            }
            records.push(cells);
        }
        let mut records = records.into_iter();
        let headers = records.next().ok_or(DashboardError::MissingHeader)?;
        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::parser::ColumnMap;
    use std::io::Cursor;
    /// Reader that hands out scripted chunks and timeouts, like a slow port.
    struct ScriptedReader {
        steps: VecDeque<io::Result<Vec<u8>>>,
    }
    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
            }
        }
    }
    fn timeout() -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
    }
    #[test]
    fn splits_stream_into_lines() {
        let mut source = StreamLineSource::new(Cursor::new(b"1,2,3\r\n4,5,N/A\n6,7,8".to_vec()));
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Line("1,2,3\r\n".into()));
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Line("4,5,N/A\n".into()));
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Line("6,7,8".into()));
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Closed);
    }
    #[test]
    fn timeout_keeps_partial_line() {
        let reader = ScriptedReader {
            steps: VecDeque::from(vec![
                Ok(b"1.0,22".to_vec()),
                timeout(),
                Ok(b".5,72\n".to_vec()),
            ]),
        };
        let mut source = StreamLineSource::new(reader);
        assert_eq!(source.next_line().unwrap(), ReadOutcome::TimedOut);
        assert_eq!(
            source.next_line().unwrap(),
            ReadOutcome::Line("1.0,22.5,72\n".into())
        );
    }
    #[test]
    fn other_io_errors_are_fatal() {
        let reader = ScriptedReader {
            steps: VecDeque::from(vec![Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "unplugged",
            ))]),
        };
        let mut source = StreamLineSource::new(reader);
        assert!(matches!(
            source.next_line(),
            Err(DashboardError::Channel(_))
        ));
    }
    #[test]
    fn invalid_utf8_bytes_are_dropped() {
        let mut source = StreamLineSource::new(Cursor::new(b"1,\xff2,3\n".to_vec()));
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Line("1,2,3\n".into()));
    }
    #[test]
    fn opening_a_missing_port_fails() {
        let result = open_serial(
            "/dev/does-not-exist-health-dashboard",
            9600,
            Duration::from_millis(10),
            Duration::ZERO,
        );
        assert!(matches!(result, Err(DashboardError::Open { .. })));
    }
    #[test]
    fn manual_source_closes_when_drained() {
        let mut source = ManualSource::new(["a"]);
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Line("a".into()));
        assert_eq!(source.next_line().unwrap(), ReadOutcome::Closed);
    }
    #[test]
    fn simulated_source_speaks_the_device_protocol() {
        let mut source = SimulatedSource::with_seed(Duration::ZERO, 7);
        assert_eq!(
            source.next_line().unwrap(),
            ReadOutcome::Line("Time(s),Temp(C),BPM".into())
        );
        for _ in 0..20 {
            let ReadOutcome::Line(line) = source.next_line().unwrap() else {
                panic!("simulated source should always produce a line");
            };
            assert_eq!(line.split(',').count(), 3, "{line}");
        }
    }
    #[test]
    fn tabular_file_skips_comments_and_blank_lines() {
        let text = "# exported from serial monitor\n\nTime(s), Temp(C), BPM\n1,20,N/A\n# pause\n2,21,70\n";
        let table = TabularFile::parse(text).unwrap();
        assert_eq!(table.headers(), ["Time(s)", "Temp(C)", "BPM"]);
        assert_eq!(table.len(), 2);
        let rows: Vec<&[String]> = table.rows().collect();
        assert_eq!(rows[1], ["2", "21", "70"]);
        // rows() can be walked again
        assert_eq!(table.rows().count(), 2);
    }
    #[test]
    fn quoted_cells_are_unwrapped() {
        let table = TabularFile::parse("\"time\",\"temp\"\n\"1\",\"2\"\n").unwrap();
        assert_eq!(table.headers(), ["time", "temp"]);
        assert_eq!(table.rows().next().unwrap(), ["1", "2"]);
    }
    #[test]
    fn quoted_header_keeps_embedded_comma() {
        let text = "Time(s),\"Temp, skin\",BPM\n1,36.5,72\n2,36.6\n";
        let table = TabularFile::parse(text).unwrap();
        assert_eq!(table.headers(), ["Time(s)", "Temp, skin", "BPM"]);
        let columns = ColumnMap::resolve(table.headers()).unwrap();
        assert_eq!(columns.heart_rate, Some(2));
        let rows: Vec<&[String]> = table.rows().collect();
        assert_eq!(rows[0], ["1", "36.5", "72"]);
        // short rows are kept as-is
        assert_eq!(rows[1], ["2", "36.6"]);
    }
    #[test]
    fn comment_only_file_has_no_header() {
        assert!(matches!(
            TabularFile::parse("# nothing here\n"),
            Err(DashboardError::MissingHeader)
        ));
    }
    #[test]
    fn missing_file_reports_read_error() {
        let result = TabularFile::open(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(DashboardError::Read { .. })));
    }
}
