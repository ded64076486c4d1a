use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs for one notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Minimum interval between fresh recommendations from the idle state.
    pub repeat_delay_secs: u64,
    /// How long the connecting notification may stay up before it counts as failed.
    pub connecting_timeout_ms: u64,
    /// How long the connected notification is shown.
    pub connected_display_ms: u64,
    /// How long the failed notification is shown.
    pub failed_display_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            repeat_delay_secs: 900,
            connecting_timeout_ms: 10_000,
            connected_display_ms: 5_000,
            failed_display_ms: 5_000,
        }
    }
}

impl NotifierConfig {
    pub fn repeat_delay_ms(&self) -> u64 {
        self.repeat_delay_secs.saturating_mul(1_000)
    }

    pub fn connecting_timeout(&self) -> Duration {
        Duration::from_millis(self.connecting_timeout_ms)
    }

    pub fn connected_display(&self) -> Duration {
        Duration::from_millis(self.connected_display_ms)
    }

    pub fn failed_display(&self) -> Duration {
        Duration::from_millis(self.failed_display_ms)
    }
}
