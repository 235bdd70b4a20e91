use std::path::PathBuf;
use std::time::Duration;
pub const DEFAULT_BAUD: u32 = 9600;
pub const DEFAULT_MAX_POINTS: usize = 100;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Opening the port resets most Arduino boards; give the sketch time to boot.
pub const BOOT_DELAY: Duration = Duration::from_secs(2);
/// Pause after each redraw so plotting never starves the reader.
pub const REDRAW_PAUSE: Duration = Duration::from_millis(100);
/// Messages the chart window may lag behind before frames are dropped.
pub const WINDOW_QUEUE: usize = 64;
pub const SIMULATED_PERIOD: Duration = Duration::from_millis(500);
/// Where samples come from. Chosen once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceMode {
    Serial { port: String },
    File { path: PathBuf },
    Simulated,
}
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub mode: SourceMode,
    pub baud: u32,
    /// Live window bound; ignored in file mode.
    pub max_points: usize,
    pub read_timeout: Duration,
    pub boot_delay: Duration,
    pub redraw_pause: Duration,
    /// Live mode: CSV snapshot destination (the chart goes next to it).
    /// File mode: chart image destination.
    pub save: Option<PathBuf>,
    pub show_window: bool,
}
impl DashboardConfig {
    pub fn new(mode: SourceMode) -> Self {
        Self {
            mode,
            baud: DEFAULT_BAUD,
            max_points: DEFAULT_MAX_POINTS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            boot_delay: BOOT_DELAY,
            redraw_pause: REDRAW_PAUSE,
            save: None,
            show_window: true,
        }
    }
    pub fn title(&self) -> String {
        match &self.mode {
            SourceMode::Serial { port } => format!("Health Monitor - {port} @ {} baud", self.baud),
            SourceMode::File { path } => format!("Health Monitor - {}", path.display()),
            SourceMode::Simulated => "Health Monitor - simulated sensor".to_string(),
        }
    }
}
