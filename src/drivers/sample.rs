/// One parsed observation from the device or a recorded file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Seconds since the device started reporting.
    pub time: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Beats per minute; `None` when the sensor reported no reading.
    pub heart_rate: Option<f64>,
}
impl Sample {
    pub fn new(time: f64, temperature: f64, heart_rate: Option<f64>) -> Self {
        Self {
            time,
            temperature,
            heart_rate,
        }
    }
}
