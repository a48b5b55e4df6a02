//! Driver configuration.

use embassy_time::Duration;

/// Orientation of the reported Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAxis {
    /// `logical_max_y - y`: origin at the top-left corner.
    Inverted,
    /// Coordinates exactly as the device reports them (origin bottom-left).
    Raw,
}

/// How the device is brought back after a suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeMode {
    /// Re-run the full reset handshake and replace the capabilities.
    Handshake,
    /// Only send `WAKE_UP`; for parts that keep their state across sleep.
    WakeCommand,
}

/// Tunables for a [`Touchpad`](crate::Touchpad).
#[derive(Debug, Clone, Copy)]
pub struct TouchpadConfig {
    /// Y axis convention applied by the decoder.
    pub y_axis: YAxis,
    /// Reports are dropped for this long after a key press. `0` disables it.
    pub quiet_time_after_typing_ms: u64,
    /// Resume strategy.
    pub resume_mode: ResumeMode,
    /// Interval at which a suspend polls for the in-flight report to finish.
    pub drain_poll_interval_ms: u32,
}

impl Default for TouchpadConfig {
    fn default() -> Self {
        Self {
            y_axis: YAxis::Inverted,
            quiet_time_after_typing_ms: 500,
            resume_mode: ResumeMode::Handshake,
            drain_poll_interval_ms: 10,
        }
    }
}

impl TouchpadConfig {
    pub fn quiet_time(&self) -> Duration {
        Duration::from_millis(self.quiet_time_after_typing_ms)
    }
}
