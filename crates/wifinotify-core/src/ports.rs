//! Collaborator traits. The notifier calls out through these and nothing
//! else, so hosts and tests can swap every side effect.
//!
//! All of them are invoked from the notifier's single event queue; none are
//! expected to block for long.

use std::time::Duration;

use crate::error::NotifierError;
use crate::network::{NetworkConfig, NetworkId};
use crate::notification::{Notification, NotificationKind};
use crate::types::{ScanCandidate, TimerFired};

/// Displays and cancels notifications by slot id.
pub trait NotificationSink: Send {
    fn notify(&mut self, notification_id: i32, notification: &Notification);
    fn cancel(&mut self, notification_id: i32);
}

/// Maps a notification kind and network into a display payload.
pub trait NotificationBuilder: Send {
    fn build(
        &self,
        kind: NotificationKind,
        tag: &str,
        network: Option<&ScanCandidate>,
    ) -> Notification;
}

/// Adds networks to the config store and asks the platform to connect.
///
/// `connect` is fire-and-forget: a dispatch failure comes back later as
/// [`NotifierEvent::ConnectionSendFailed`](crate::types::NotifierEvent), and
/// the outcome as `WifiConnected` or `ConnectionFailure`.
pub trait ConnectionInitiator: Send {
    fn build_network_config(&self, candidate: &ScanCandidate) -> Option<NetworkConfig> {
        NetworkConfig::from_scan(candidate)
    }

    fn add_or_update_network(
        &mut self,
        config: &NetworkConfig,
        owner_uid: u32,
    ) -> Result<NetworkId, NotifierError>;

    fn connect(&mut self, network_id: NetworkId);
}

/// Opens the full network picker for the user.
pub trait NetworkPicker: Send {
    fn open_network_picker(&mut self);
}

/// Delivers `fired` back into the notifier's queue after `delay`.
///
/// There is no cancel; the notifier ignores timers that no longer apply.
pub trait TimerScheduler: Send {
    fn schedule(&mut self, delay: Duration, fired: TimerFired);
}

/// Reads the current value of a settings toggle.
pub trait SettingSource: Send {
    fn is_enabled(&self, settings_key: &str) -> bool;
}
