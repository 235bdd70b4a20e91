// src/types.rs
use std::path::PathBuf;
use crate::drivers::Sample;
// 实时模式的运行状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Opening,
    Reading,
    Cancelled,
    ChannelError,
    Closing,
    SavingSnapshot,
    Done,
}
impl RunState {
    pub fn label(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Opening => "opening",
            RunState::Reading => "reading",
            RunState::Cancelled => "stopped by user",
            RunState::ChannelError => "channel error",
            RunState::Closing => "closing",
            RunState::SavingSnapshot => "saving snapshot",
            RunState::Done => "done",
        }
    }
}
// 读取循环结束的原因
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    SourceClosed,
    ChannelError(String),
}
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub csv: PathBuf,
    pub image: PathBuf,
}
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub accepted: usize,
    pub rejected: usize,
    /// Samples left in the window when the run ended.
    pub retained: Vec<Sample>,
    pub snapshot: Option<SnapshotPaths>,
}
// 后台读取线程发给 GUI 的消息
#[derive(Clone, Debug)]
pub enum EngineMessage {
    State(RunState),
    Frame(Vec<Sample>),
    Log(String),
    Finished(RunSummary),
}
