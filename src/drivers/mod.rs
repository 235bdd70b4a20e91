// src/drivers/mod.rs
pub mod buffer;
pub mod dataset;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod plot;
pub mod sample;
pub mod source;
// 公开导出常用类型，方便外部调用
pub use buffer::SampleWindow;
pub use dataset::Dataset;
pub use error::DashboardError;
pub use pipeline::{LivePipeline, Pump};
pub use plot::{save_dashboard, DashboardSeries, PlotStyle};
pub use sample::Sample;
pub use source::{open_serial, LineSource, SimulatedSource};
