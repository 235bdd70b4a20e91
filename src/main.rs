// src/main.rs
mod config;
mod drivers;
mod engine;
mod gui;
mod recorder;
mod types;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, ValueHint};
use log::info;
use crate::config::{DashboardConfig, SourceMode, DEFAULT_BAUD, DEFAULT_MAX_POINTS, WINDOW_QUEUE};
use crate::gui::DashboardApp;
use crate::types::{RunSummary, StopReason};
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Arduino health monitor dashboard (serial or file mode)"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    /// Serial baud rate (serial mode only)
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,
    /// Max points to show in the live plot
    #[arg(long = "max", default_value_t = DEFAULT_MAX_POINTS as u64, value_parser = clap::value_parser!(u64).range(1..))]
    max_points: u64,
    /// Serial mode: save the last data to this CSV on exit (chart saved alongside).
    /// File mode: save the chart to this image file
    #[arg(long, value_hint = ValueHint::FilePath)]
    save: Option<PathBuf>,
    /// Serial read timeout in seconds
    #[arg(long, default_value = "1.0", value_parser = parse_seconds)]
    timeout: Duration,
    /// Do not open the chart window
    #[arg(long)]
    no_window: bool,
}
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Serial port (e.g. COM3 or /dev/ttyUSB0)
    #[arg(long)]
    port: Option<String>,
    /// CSV file path (exported from the serial monitor)
    #[arg(long, value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,
    /// Generate synthetic readings instead of using a device
    #[arg(long)]
    simulate: bool,
}
fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw.parse().map_err(|_| format!("{raw:?} is not a number"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("timeout must be a positive number of seconds".into());
    }
    Ok(Duration::from_secs_f64(secs))
}
impl Cli {
    fn into_config(self) -> DashboardConfig {
        let mode = match (self.source.port, self.source.file) {
            (Some(port), _) => SourceMode::Serial { port },
            (None, Some(path)) => SourceMode::File { path },
            (None, None) => SourceMode::Simulated,
        };
        let mut config = DashboardConfig::new(mode);
        config.baud = self.baud;
        config.max_points = usize::try_from(self.max_points).unwrap_or(usize::MAX);
        config.read_timeout = self.timeout;
        config.save = self.save;
        config.show_window = !self.no_window;
        config
    }
}
// 入口函数
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Cli::parse().into_config();
    if let SourceMode::File { path } = &config.mode {
        return file_mode(path, &config);
    }
    live_mode(config)
}
fn file_mode(path: &Path, config: &DashboardConfig) -> Result<()> {
    let dataset = engine::load_file(path)
        .with_context(|| format!("ERROR reading {}", path.display()))?;
    if let Some(target) = &config.save {
        engine::save_file_chart(&dataset, target)
            .with_context(|| format!("ERROR saving plot to {}", target.display()))?;
    }
    if config.show_window {
        gui::run_window(&config.title(), DashboardApp::still(dataset.samples()))
            .map_err(|e| anyhow!("chart window failed: {e}"))?;
    }
    Ok(())
}
fn live_mode(config: DashboardConfig) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))
            .context("failed to install Ctrl+C handler")?;
    }
    // 打开失败直接退出，不显示图表
    let source = engine::open_source(&config).context("ERROR opening live source")?;
    if !config.show_window {
        let summary = engine::run_live(source, &config, &cancel, &mut engine::LogSink)?;
        return finish(summary);
    }
    let (tx, rx) = sync_channel(WINDOW_QUEUE);
    let worker = {
        let config = config.clone();
        let cancel = cancel.clone();
        thread::spawn(move || engine::run_live_to_window(source, &config, &cancel, tx))
    };
    let shown = gui::run_window(&config.title(), DashboardApp::live(rx, cancel.clone()));
    // 关闭窗口等同于 Ctrl+C
    cancel.store(true, Ordering::SeqCst);
    let summary = worker
        .join()
        .map_err(|_| anyhow!("reader thread panicked"))??;
    shown.map_err(|e| anyhow!("chart window failed: {e}"))?;
    finish(summary)
}
fn finish(summary: RunSummary) -> Result<()> {
    match summary.reason {
        StopReason::ChannelError(e) => bail!("serial channel failed: {e}"),
        StopReason::Cancelled | StopReason::SourceClosed => {
            info!("done ({} samples kept)", summary.retained.len());
            Ok(())
        }
    }
}
