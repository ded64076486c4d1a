//! JSON-lines event feed.
//!
//! One object per line, discriminated by `type`. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! {"type":"screen","on":true}
//! {"type":"scan_results","candidates":[{"ssid":"Cafe","rssi":-50}]}
//! {"type":"action","action":"connect_to_network"}
//! {"type":"sleep","ms":3000}
//! {"type":"wifi_connected","ssid":"Cafe"}
//! ```

use serde::Deserialize;

use wifinotify_core::{ActionKind, ScanCandidate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// Scan results. Without a tag every notifier sees them.
    ScanResults {
        #[serde(default)]
        tag: Option<String>,
        candidates: Vec<ScanCandidate>,
    },
    Screen {
        on: bool,
    },
    WifiConnected {
        #[serde(default)]
        ssid: Option<String>,
    },
    ConnectionFailure,
    /// A connect request never left the host. Without a tag it goes to the
    /// notifiers that are connecting.
    ConnectionSendFailed {
        #[serde(default)]
        tag: Option<String>,
        #[serde(default)]
        reason: i32,
    },
    /// A notification action. Without a tag it goes to the first notifier.
    Action {
        #[serde(default)]
        tag: Option<String>,
        action: ActionKind,
    },
    /// Flip a settings toggle and notify the notifiers that watch it.
    Setting {
        key: String,
        enabled: bool,
    },
    Clear {
        #[serde(default)]
        reset_repeat_time: bool,
    },
    /// Pause the feed reader; queued timers keep running.
    Sleep {
        ms: u64,
    },
    /// Print every notifier's state.
    Dump,
}

/// Parse one feed line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<FeedEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}
