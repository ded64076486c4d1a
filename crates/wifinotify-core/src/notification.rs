//! Notification payloads and the default builder.

use serde::{Deserialize, Serialize};

use crate::ports::NotificationBuilder;
use crate::types::{ActionKind, ScanCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// "A network is available" recommendation.
    RecommendNetwork,
    ConnectingToNetwork,
    ConnectedToNetwork,
    FailedToConnect,
}

/// Display payload handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Tag of the notifier that posted it; echoed back on actions.
    pub tag: String,
    pub title: String,
    pub ssid: Option<String>,
    /// Buttons offered to the user.
    pub actions: Vec<ActionKind>,
    /// Action delivered when the user swipes the notification away.
    pub delete_action: Option<ActionKind>,
}

/// Plain-text builder used when the host has no richer presentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNotificationBuilder;

impl NotificationBuilder for DefaultNotificationBuilder {
    fn build(
        &self,
        kind: NotificationKind,
        tag: &str,
        network: Option<&ScanCandidate>,
    ) -> Notification {
        let ssid = network.map(|n| n.ssid.clone());
        let (title, actions, delete_action) = match kind {
            NotificationKind::RecommendNetwork => (
                "Connect to an available Wi-Fi network".to_string(),
                vec![ActionKind::ConnectToNetwork, ActionKind::PickWifiNetwork],
                Some(ActionKind::UserDismissed),
            ),
            NotificationKind::ConnectingToNetwork => (
                format!("Connecting to {}", ssid.as_deref().unwrap_or("Wi-Fi network")),
                Vec::new(),
                None,
            ),
            NotificationKind::ConnectedToNetwork => (
                format!("Connected to {}", ssid.as_deref().unwrap_or("Wi-Fi network")),
                Vec::new(),
                None,
            ),
            NotificationKind::FailedToConnect => (
                "Could not connect to Wi-Fi network".to_string(),
                vec![ActionKind::PickWifiNetworkAfterFailure],
                None,
            ),
        };

        Notification {
            kind,
            tag: tag.to_string(),
            title,
            ssid,
            actions,
            delete_action,
        }
    }
}
