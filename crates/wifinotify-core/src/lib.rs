//! wifinotify-core: available-network recommendation and notification
//! lifecycle. Selector, blocklist, admission policy and the notifier state
//! machine. Pure logic; every side effect goes through the traits in
//! [`ports`] so the host decides how notifications, connections, timers and
//! persistence are carried out.

pub mod admission;
pub mod blocklist;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod notification;
pub mod notifier;
pub mod ports;
pub mod selector;
pub mod types;

pub use admission::{
    AdmissionPolicy, NoRestrictions, StaticRestrictions, UserRestriction, UserRestrictions,
};
pub use blocklist::{Blocklist, BlocklistStore, MemoryBlocklistStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::NotifierConfig;
pub use error::{NotifierError, StoreError};
pub use metrics::NotifierMetrics;
pub use network::{NetworkConfig, NetworkId, SecurityType, WIFI_UID};
pub use notification::{DefaultNotificationBuilder, Notification, NotificationKind};
pub use notifier::{NetworkNotifier, NotifierDump, NotifierPorts};
pub use ports::{
    ConnectionInitiator, NetworkPicker, NotificationBuilder, NotificationSink, SettingSource,
    TimerScheduler,
};
pub use selector::recommend_network;
pub use types::{
    ActionEvent, ActionKind, NotificationState, NotifierEvent, NotifierIdentity, NotifierTimer,
    ScanCandidate, TimerFired,
};
