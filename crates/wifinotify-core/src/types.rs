use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NotifierError;

// ─── Notifier Identity ────────────────────────────────────────────

/// Everything that distinguishes one notifier instance from another
/// (e.g. "open networks" vs "carrier networks").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierIdentity {
    /// Tag used for logs, metrics and action filtering.
    pub tag: String,
    /// Name of the persisted SSID set holding this notifier's blocklist.
    pub store_key: String,
    /// Name of the settings toggle that enables this notifier.
    pub settings_key: String,
    /// Slot the notification is posted to / cancelled from.
    pub notification_id: i32,
    /// Nominator id attributed to networks added from this notifier.
    pub nominator_id: i32,
}

impl NotifierIdentity {
    pub fn open_networks() -> Self {
        Self {
            tag: "WifiOpenNetworkNotifier".into(),
            store_key: "OpenNetworkNotifierBlacklist".into(),
            settings_key: "wifi_networks_available_notification_on".into(),
            notification_id: 17,
            nominator_id: 9,
        }
    }

    pub fn carrier_networks() -> Self {
        Self {
            tag: "WifiCarrierNetworkNotifier".into(),
            store_key: "CarrierNetworkNotifierBlacklist".into(),
            settings_key: "wifi_carrier_networks_available_notification_on".into(),
            notification_id: 18,
            nominator_id: 5,
        }
    }
}

// ─── Notification State ───────────────────────────────────────────

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    /// No recommendation is made and nothing is shown.
    #[default]
    NoNotification,
    /// A notification recommending a network is shown.
    Recommending,
    /// Connecting to the recommended network.
    Connecting,
    /// Connection to the recommended network succeeded.
    Connected,
    /// Connection to the recommended network failed.
    Failed,
}

impl NotificationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoNotification => "no_notification",
            Self::Recommending => "recommending",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NotificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Scan Candidate ───────────────────────────────────────────────

/// A scanned network eligible for recommendation.
///
/// Carries the raw record fields needed to turn it into a connectable
/// network config later on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCandidate {
    pub ssid: String,
    /// Signal strength in dBm. Higher is stronger.
    pub rssi: i32,
    #[serde(default)]
    pub bssid: String,
    /// Raw capability flags, e.g. `"[ESS]"` or `"[WPA2-PSK-CCMP][ESS]"`.
    #[serde(default)]
    pub capabilities: String,
    #[serde(default)]
    pub frequency_mhz: u32,
}

impl ScanCandidate {
    pub fn new(ssid: impl Into<String>, rssi: i32) -> Self {
        Self {
            ssid: ssid.into(),
            rssi,
            bssid: String::new(),
            capabilities: "[ESS]".into(),
            frequency_mhz: 2437,
        }
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: impl Into<String>) -> Self {
        self.capabilities = capabilities.into();
        self
    }

    #[must_use]
    pub fn with_bssid(mut self, bssid: impl Into<String>) -> Self {
        self.bssid = bssid.into();
        self
    }
}

// ─── User Actions ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UserDismissed,
    ConnectToNetwork,
    PickWifiNetwork,
    PickWifiNetworkAfterFailure,
}

impl ActionKind {
    pub const ALL: [Self; 4] = [
        Self::UserDismissed,
        Self::ConnectToNetwork,
        Self::PickWifiNetwork,
        Self::PickWifiNetworkAfterFailure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserDismissed => "user_dismissed",
            Self::ConnectToNetwork => "connect_to_network",
            Self::PickWifiNetwork => "pick_wifi_network",
            Self::PickWifiNetworkAfterFailure => "pick_wifi_network_after_failure",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = NotifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| NotifierError::UnknownAction(s.to_string()))
    }
}

/// A user action delivered from a notification, addressed by notifier tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub tag: String,
    pub action: ActionKind,
}

impl ActionEvent {
    pub fn new(tag: impl Into<String>, action: ActionKind) -> Self {
        Self {
            tag: tag.into(),
            action,
        }
    }
}

// ─── Timers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierTimer {
    /// The connecting notification has been up too long without a result.
    ConnectingTimeout,
    /// The connected notification has been shown long enough.
    ConnectedShown,
    /// The failed notification has been shown long enough.
    FailedShown,
}

/// A timer firing, tagged with the generation it was armed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerFired {
    pub timer: NotifierTimer,
    pub generation: u64,
}

// ─── Inbound Events ───────────────────────────────────────────────

/// Every input the notifier reacts to, as one ordered stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierEvent {
    ScanResults { candidates: Vec<ScanCandidate> },
    ScreenStateChanged { on: bool },
    WifiConnected { ssid: Option<String> },
    ConnectionFailure,
    /// The connection request could not be dispatched at all.
    ConnectionSendFailed { reason: i32 },
    Action(ActionEvent),
    /// The settings toggle changed; the new value is re-read from the source.
    SettingChanged,
    ClearPending { reset_repeat_time: bool },
    Timer(TimerFired),
    /// A late store load whose contents are merged into the blocklist.
    BlocklistRestored { ssids: Vec<String> },
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_round_trips_through_str() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().expect("parse"), kind);
        }
    }

    #[test]
    fn action_kind_parse_is_case_insensitive() {
        let kind: ActionKind = "CONNECT_TO_NETWORK".parse().expect("parse");
        assert_eq!(kind, ActionKind::ConnectToNetwork);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = "reboot".parse::<ActionKind>().unwrap_err();
        assert!(matches!(err, NotifierError::UnknownAction(ref s) if s == "reboot"));
    }

    #[test]
    fn default_state_is_no_notification() {
        assert_eq!(NotificationState::default(), NotificationState::NoNotification);
    }

    #[test]
    fn scan_results_event_uses_type_tag() {
        let json = r#"{"type":"scan_results","candidates":[{"ssid":"Net1","rssi":-60}]}"#;
        let event: NotifierEvent = serde_json::from_str(json).expect("deserialize");
        match event {
            NotifierEvent::ScanResults { candidates } => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates[0].ssid, "Net1");
                assert_eq!(candidates[0].rssi, -60);
                assert!(candidates[0].capabilities.is_empty());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn action_event_flattens_under_type_tag() {
        let json = r#"{"type":"action","tag":"WifiOpenNetworkNotifier","action":"user_dismissed"}"#;
        let event: NotifierEvent = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            event,
            NotifierEvent::Action(ActionEvent::new(
                "WifiOpenNetworkNotifier",
                ActionKind::UserDismissed
            ))
        );
    }

    #[test]
    fn presets_have_distinct_slots_and_keys() {
        let open = NotifierIdentity::open_networks();
        let carrier = NotifierIdentity::carrier_networks();
        assert_ne!(open.tag, carrier.tag);
        assert_ne!(open.store_key, carrier.store_key);
        assert_ne!(open.notification_id, carrier.notification_id);
    }
}
