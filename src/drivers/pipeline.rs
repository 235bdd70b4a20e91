use crate::drivers::error::DashboardError;
use crate::drivers::parser::{parse_line, Rejection};
use crate::drivers::source::{LineSource, ReadOutcome};
use crate::drivers::{Sample, SampleWindow};
/// What a single [`LivePipeline::pump_once`] call did.
#[derive(Clone, Debug, PartialEq)]
pub enum Pump {
    Accepted(Sample),
    Rejected(Rejection),
    /// The read timed out; no record this cycle.
    Idle,
    Closed,
}
/// High level pipeline that reads lines, parses them and keeps the bounded
/// window ready to plot.
pub struct LivePipeline<S: LineSource> {
    source: S,
    window: SampleWindow,
    accepted: usize,
    rejected: usize,
}
impl<S: LineSource> LivePipeline<S> {
    pub fn new(source: S, max_points: usize) -> Result<Self, DashboardError> {
        Ok(Self {
            source,
            window: SampleWindow::new(max_points)?,
            accepted: 0,
            rejected: 0,
        })
    }
    pub fn pump_once(&mut self) -> Result<Pump, DashboardError> {
        let line = match self.source.next_line()? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::TimedOut => return Ok(Pump::Idle),
            ReadOutcome::Closed => return Ok(Pump::Closed),
        };
        match parse_line(&line) {
            Ok(sample) => {
                self.window.push(sample);
                self.accepted += 1;
                Ok(Pump::Accepted(sample))
            }
            Err(reason) => {
                self.rejected += 1;
                Ok(Pump::Rejected(reason))
            }
        }
    }
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }
    pub fn accepted(&self) -> usize {
        self.accepted
    }
    pub fn rejected(&self) -> usize {
        self.rejected
    }
    /// Drops the source (closing any device) and hands back the window.
    pub fn close(self) -> SampleWindow {
        let Self { source, window, .. } = self;
        drop(source);
        window
    }
}
