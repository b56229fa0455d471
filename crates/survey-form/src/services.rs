use std::time::Duration;

/// Device-level toggles read once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Start the audio recorder when the first page renders.
    pub auto_record: bool,
    /// Start interval photo capture when the first page renders.
    pub auto_capture: bool,
    /// Interval between automatic photos.
    pub capture_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            auto_record: false,
            auto_capture: false,
            capture_interval: Duration::from_secs(30),
        }
    }
}

/// A cached device position. Altitude is reported as-is even when the
/// platform leaves it at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl LocationFix {
    /// Wire text stored under the reserved location question.
    pub fn to_answer_text(&self) -> String {
        format!(
            "lat:{},lon:{},alt:{}",
            self.latitude, self.longitude, self.altitude
        )
    }
}

/// Source of the device's cached position. Submission only ever reads the
/// last known fix; the session never blocks waiting for a fresh one.
pub trait LocationProvider {
    fn start_updates(&mut self, interval: Duration);
    fn stop_updates(&mut self);
    fn last_known(&self) -> Option<LocationFix>;
}

/// Provider used when the host exposes no positioning source. The
/// reserved location question then submits with an empty value.
#[derive(Debug, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn start_updates(&mut self, _interval: Duration) {}

    fn stop_updates(&mut self) {}

    fn last_known(&self) -> Option<LocationFix> {
        None
    }
}
