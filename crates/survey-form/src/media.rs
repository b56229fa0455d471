use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the host's recording and capture backends. A
/// failure disables the affected feature for the rest of the session; it
/// never blocks answering or submission.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media backend unavailable: {0}")]
    Unavailable(String),
    #[error("media permission denied")]
    PermissionDenied,
    #[error("no output file was produced")]
    MissingOutput,
    #[error("capture failed: {0}")]
    Capture(String),
}

/// Background audio recorder driven by the auto-record setting. `stop`
/// returns only once the finished file is flushed and readable, so the
/// returned path can be enqueued for upload immediately.
pub trait AudioRecorder {
    fn start(&mut self, label: &str) -> Result<(), MediaError>;
    fn stop(&mut self) -> Result<PathBuf, MediaError>;
}

/// Interval photo capture driven by the auto-capture setting.
pub trait PhotoCapture {
    fn start(&mut self, interval: std::time::Duration, label: &str) -> Result<(), MediaError>;
    fn stop(&mut self) -> Result<Vec<PathBuf>, MediaError>;
}
