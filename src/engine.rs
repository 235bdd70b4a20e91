// src/engine.rs
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::thread;
use log::{debug, error, info, warn};
use crate::config::{DashboardConfig, SourceMode, SIMULATED_PERIOD};
use crate::drivers::{
    open_serial, save_dashboard, Dataset, DashboardError, DashboardSeries, LineSource,
    LivePipeline, PlotStyle, Pump, Sample, SimulatedSource,
};
use crate::recorder::SnapshotWriter;
use crate::types::{EngineMessage, RunState, RunSummary, StopReason};
/// Receives every redraw request of a live run.
pub trait FrameSink {
    fn show(&mut self, samples: &[Sample]);
    fn state(&mut self, _state: RunState) {}
}
/// Forwards frames to the chart window over a bounded queue.
///
/// Frames are dropped while the queue is full; each frame carries the whole
/// window, so the next one that fits replaces the lost ones.
pub struct ChannelSink {
    tx: SyncSender<EngineMessage>,
}
impl ChannelSink {
    pub fn new(tx: SyncSender<EngineMessage>) -> Self {
        Self { tx }
    }
}
impl FrameSink for ChannelSink {
    fn show(&mut self, samples: &[Sample]) {
        match self.tx.try_send(EngineMessage::Frame(samples.to_vec())) {
            Err(TrySendError::Full(_)) => debug!("chart window is behind, frame dropped"),
            // 窗口已关闭时发送会失败，忽略即可
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
        }
    }
    fn state(&mut self, state: RunState) {
        self.tx.send(EngineMessage::State(state)).ok();
    }
}
/// Headless stand-in for the chart: one log line per redraw.
pub struct LogSink;
impl FrameSink for LogSink {
    fn show(&mut self, samples: &[Sample]) {
        if let Some(latest) = samples.last() {
            let bpm = latest
                .heart_rate
                .map(|b| format!("{b:.0}"))
                .unwrap_or_else(|| "N/A".into());
            info!(
                "t={:.2}s temp={:.2}°C bpm={} ({} points)",
                latest.time,
                latest.temperature,
                bpm,
                samples.len()
            );
        }
    }
}
/// Opens the live source chosen on the command line.
///
/// A failure here ends the run before anything is shown.
pub fn open_source(config: &DashboardConfig) -> Result<Box<dyn LineSource + Send>, DashboardError> {
    debug!("state: {}", RunState::Opening.label());
    let source: Box<dyn LineSource + Send> = match &config.mode {
        SourceMode::Serial { port } => {
            let serial = open_serial(port, config.baud, config.read_timeout, config.boot_delay)?;
            debug!("serial channel {} ready", serial.get_ref().name());
            Box::new(serial)
        }
        SourceMode::Simulated => Box::new(SimulatedSource::new(SIMULATED_PERIOD)),
        SourceMode::File { path } => return Err(DashboardError::NotLive(path.clone())),
    };
    Ok(source)
}
/// Read → parse → push → redraw until cancelled or the channel fails, then
/// close the source and write the snapshot if one was requested.
pub fn run_live<S: LineSource>(
    source: S,
    config: &DashboardConfig,
    cancel: &AtomicBool,
    sink: &mut dyn FrameSink,
) -> Result<RunSummary, DashboardError> {
    let mut pipeline = LivePipeline::new(source, config.max_points)?;
    sink.state(RunState::Reading);
    info!("Reading samples. Press Ctrl+C to stop.");
    let reason = loop {
        if cancel.load(Ordering::SeqCst) {
            break StopReason::Cancelled;
        }
        match pipeline.pump_once() {
            Ok(Pump::Accepted(_)) => {
                sink.show(&pipeline.window().snapshot());
                thread::sleep(config.redraw_pause);
            }
            Ok(Pump::Rejected(reason)) => debug!("skipped record: {reason}"),
            Ok(Pump::Idle) => {}
            Ok(Pump::Closed) => break StopReason::SourceClosed,
            Err(e) => {
                error!("{e}");
                break StopReason::ChannelError(e.to_string());
            }
        }
    };
    match &reason {
        StopReason::Cancelled => {
            info!("Stopped by user.");
            sink.state(RunState::Cancelled);
        }
        StopReason::ChannelError(_) => sink.state(RunState::ChannelError),
        StopReason::SourceClosed => info!("Source closed."),
    }
    sink.state(RunState::Closing);
    let (accepted, rejected) = (pipeline.accepted(), pipeline.rejected());
    let window = pipeline.close();
    if window.is_empty() {
        warn!("no samples were received");
    } else {
        debug!("{} of {} points retained", window.len(), config.max_points);
    }
    let retained = window.snapshot();
    let snapshot = match &config.save {
        Some(path) => {
            sink.state(RunState::SavingSnapshot);
            match SnapshotWriter::new(path).save(&retained) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    sink.state(RunState::Done);
                    return Err(e);
                }
            }
        }
        None => None,
    };
    sink.state(RunState::Done);
    info!("{accepted} samples accepted, {rejected} records skipped");
    Ok(RunSummary {
        reason,
        accepted,
        rejected,
        retained,
        snapshot,
    })
}
/// Same as [`run_live`] but reports the end of the run to the chart window.
pub fn run_live_to_window<S: LineSource>(
    source: S,
    config: &DashboardConfig,
    cancel: &AtomicBool,
    tx: SyncSender<EngineMessage>,
) -> Result<RunSummary, DashboardError> {
    let mut sink = ChannelSink::new(tx.clone());
    let result = run_live(source, config, cancel, &mut sink);
    match &result {
        Ok(summary) => {
            tx.send(EngineMessage::Finished(summary.clone())).ok();
        }
        Err(e) => {
            tx.send(EngineMessage::Log(format!("ERROR: {e}"))).ok();
        }
    }
    result
}
/// Loads a recorded file for file mode.
pub fn load_file(path: &Path) -> Result<Dataset, DashboardError> {
    let dataset = Dataset::load(path)?;
    info!(
        "loaded {} samples from {}",
        dataset.samples().len(),
        path.display()
    );
    if dataset.rejected() > 0 {
        warn!("{} rows skipped (unreadable time or temperature)", dataset.rejected());
    }
    if dataset.columns().heart_rate.is_none() {
        warn!("no heart-rate column found");
    }
    Ok(dataset)
}
/// Saves the chart of a loaded file and returns the image path written.
pub fn save_file_chart(dataset: &Dataset, target: &Path) -> Result<PathBuf, DashboardError> {
    let series = DashboardSeries::from_samples(dataset.samples());
    let written = save_dashboard(&series, target, &PlotStyle::default())?;
    info!("Saved plot to {}", written.display());
    Ok(written)
}
