// src/gui.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};
use crate::config::REDRAW_PAUSE;
use crate::drivers::{DashboardSeries, Sample};
use crate::types::{EngineMessage, RunState, StopReason};
const TEMPERATURE_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
const HEART_RATE_COLOR: Color32 = Color32::from_rgb(220, 40, 40);
const MAX_LOG_LINES: usize = 6;
pub struct DashboardApp {
    series: DashboardSeries,
    latest: Option<Sample>,
    state: RunState,
    log_messages: Vec<String>,
    // 通讯管道 (文件模式下为 None)
    rx: Option<Receiver<EngineMessage>>,
    cancel: Option<Arc<AtomicBool>>,
}
impl DashboardApp {
    /// Window fed by a running live session.
    pub fn live(rx: Receiver<EngineMessage>, cancel: Arc<AtomicBool>) -> Self {
        Self {
            series: DashboardSeries::default(),
            latest: None,
            state: RunState::Idle,
            log_messages: Vec::new(),
            rx: Some(rx),
            cancel: Some(cancel),
        }
    }
    /// Window showing a fully loaded dataset, drawn once.
    pub fn still(samples: &[Sample]) -> Self {
        Self {
            series: DashboardSeries::from_samples(samples),
            latest: samples.last().copied(),
            state: RunState::Done,
            log_messages: vec![format!("> {} samples loaded", samples.len())],
            rx: None,
            cancel: None,
        }
    }
    fn log(&mut self, msg: String) {
        self.log_messages.push(format!("> {msg}"));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }
    fn is_running(&self) -> bool {
        self.rx.is_some() && self.state != RunState::Done
    }
    fn apply(&mut self, msg: EngineMessage) {
        match msg {
            EngineMessage::State(state) => self.state = state,
            EngineMessage::Frame(samples) => {
                self.series = DashboardSeries::from_samples(&samples);
                self.latest = samples.last().copied();
            }
            EngineMessage::Log(line) => self.log(line),
            EngineMessage::Finished(summary) => {
                self.state = RunState::Done;
                let reason = match &summary.reason {
                    StopReason::Cancelled => "stopped by user".to_string(),
                    StopReason::SourceClosed => "source closed".to_string(),
                    StopReason::ChannelError(e) => format!("channel error: {e}"),
                };
                self.log(format!(
                    "{reason}; {} samples, {} skipped",
                    summary.accepted, summary.rejected
                ));
                if let Some(paths) = summary.snapshot {
                    self.log(format!("saved {}", paths.csv.display()));
                    self.log(format!("saved {}", paths.image.display()));
                }
            }
        }
    }
    fn drain_messages(&mut self) {
        let Some(rx) = self.rx.take() else {
            return;
        };
        // 只绘制最新的一帧
        let mut frame = None;
        while let Ok(msg) = rx.try_recv() {
            match msg {
                EngineMessage::Frame(samples) => frame = Some(samples),
                other => self.apply(other),
            }
        }
        if let Some(samples) = frame {
            self.apply(EngineMessage::Frame(samples));
        }
        self.rx = Some(rx);
    }
    fn status_text(&self) -> String {
        let latest = match self.latest {
            Some(s) => {
                let bpm = s
                    .heart_rate
                    .map(|b| format!("{b:.0}"))
                    .unwrap_or_else(|| "N/A".into());
                format!("t = {:.2} s   {:.2} °C   {bpm} BPM", s.time, s.temperature)
            }
            None => "waiting for data".to_string(),
        };
        format!("[{}]   {latest}", self.state.label())
    }
}
fn to_plot_points(points: &[(f64, f64)]) -> Vec<[f64; 2]> {
    points.iter().map(|&(x, y)| [x, y]).collect()
}
impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages();
        if self.is_running() {
            ctx.request_repaint_after(REDRAW_PAUSE);
        }
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Health Monitor");
                ui.separator();
                ui.monospace(self.status_text());
                if let Some(cancel) = &self.cancel {
                    if self.state == RunState::Reading && ui.button("STOP").clicked() {
                        cancel.store(true, Ordering::SeqCst);
                    }
                }
            });
        });
        if !self.log_messages.is_empty() {
            egui::TopBottomPanel::bottom("log").show(ctx, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            let height = ((ui.available_height() - ui.spacing().item_spacing.y) / 2.0).max(80.0);
            Plot::new("temperature")
                .height(height)
                .link_axis("time", true, false)
                .y_axis_label("Temp (°C)")
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    if self.series.is_empty() {
                        return;
                    }
                    let points = to_plot_points(&self.series.temperature);
                    plot_ui.line(
                        Line::new(PlotPoints::new(points.clone()))
                            .color(TEMPERATURE_COLOR)
                            .name("Temperature"),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::new(points))
                            .shape(MarkerShape::Circle)
                            .radius(3.0)
                            .color(TEMPERATURE_COLOR),
                    );
                });
            Plot::new("heart_rate")
                .height(height)
                .link_axis("time", true, false)
                .x_axis_label("Time (s)")
                .y_axis_label("BPM")
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    let points = to_plot_points(&self.series.heart_rate);
                    if points.is_empty() {
                        return;
                    }
                    plot_ui.line(
                        Line::new(PlotPoints::new(points.clone()))
                            .color(HEART_RATE_COLOR)
                            .name("BPM"),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::new(points))
                            .shape(MarkerShape::Cross)
                            .radius(4.0)
                            .color(HEART_RATE_COLOR),
                    );
                });
        });
    }
}
/// Blocks until the chart window is closed.
pub fn run_window(title: &str, app: DashboardApp) -> eframe::Result<()> {
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([900.0, 700.0])
        .with_min_inner_size([480.0, 360.0])
        .with_title(title);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(title, options, Box::new(move |_cc| Box::new(app)))
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use crate::types::RunSummary;
    #[test]
    fn live_app_follows_engine_messages() {
        let (tx, rx) = channel();
        let mut app = DashboardApp::live(rx, Arc::new(AtomicBool::new(false)));
        tx.send(EngineMessage::State(RunState::Reading)).unwrap();
        tx.send(EngineMessage::Frame(vec![
            Sample::new(1.0, 22.5, Some(72.0)),
            Sample::new(2.0, 22.7, None),
        ]))
        .unwrap();
        app.drain_messages();
        assert!(app.is_running());
        assert_eq!(app.series.temperature.len(), 2);
        assert_eq!(app.series.heart_rate, vec![(1.0, 72.0)]);
        assert_eq!(app.latest.map(|s| s.time), Some(2.0));
        tx.send(EngineMessage::Finished(RunSummary {
            reason: StopReason::Cancelled,
            accepted: 2,
            rejected: 0,
            retained: Vec::new(),
            snapshot: None,
        }))
        .unwrap();
        app.drain_messages();
        assert!(!app.is_running());
        assert!(app.log_messages[0].contains("stopped by user"));
    }
    #[test]
    fn backlog_of_frames_draws_only_the_newest() {
        let (tx, rx) = channel();
        let mut app = DashboardApp::live(rx, Arc::new(AtomicBool::new(false)));
        for t in 1..=5 {
            tx.send(EngineMessage::Frame(vec![Sample::new(t as f64, 20.0, None)]))
                .unwrap();
        }
        tx.send(EngineMessage::State(RunState::Closing)).unwrap();
        app.drain_messages();
        assert_eq!(app.series.temperature, vec![(5.0, 20.0)]);
        assert_eq!(app.latest.map(|s| s.time), Some(5.0));
        assert_eq!(app.state, RunState::Closing);
    }
    #[test]
    fn still_app_keeps_dataset_series() {
        let samples = [Sample::new(0.0, 36.0, None), Sample::new(1.0, 36.1, Some(70.0))];
        let app = DashboardApp::still(&samples);
        assert!(!app.is_running());
        assert_eq!(app.series, DashboardSeries::from_samples(&samples));
        assert!(app.status_text().contains("70 BPM"));
    }
}
