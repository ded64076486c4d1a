//! Host-side collaborators: notifications, picker requests and network
//! adds are written as JSON lines instead of reaching a real platform.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error};

use wifinotify_core::{
    Clock, ConnectionInitiator, NetworkConfig, NetworkId, NetworkPicker, Notification,
    NotificationSink, NotifierDump, NotifierError, SettingSource, SystemClock,
};

/// One line of runtime output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputRecord {
    Notify {
        notification_id: i32,
        notification: Notification,
    },
    Cancel {
        notification_id: i32,
        tag: String,
    },
    NetworkAdded {
        network_id: NetworkId,
        config: NetworkConfig,
        owner_uid: u32,
    },
    Connect {
        network_id: NetworkId,
    },
    OpenPicker {
        tag: String,
    },
    Dump {
        notifiers: Vec<NotifierDump>,
    },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── Emitter ─────────────────────────────────────────────────────

/// Where output records go.
#[derive(Clone)]
pub enum Emitter {
    Stdout,
    Capture(Arc<Mutex<Vec<OutputRecord>>>),
}

impl Emitter {
    /// An emitter that keeps records in memory, plus a handle to read them.
    pub fn capture() -> (Self, Arc<Mutex<Vec<OutputRecord>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        (Self::Capture(Arc::clone(&records)), records)
    }

    pub fn emit(&self, record: OutputRecord) {
        match self {
            Self::Stdout => match serde_json::to_string(&record) {
                Ok(line) => println!("{line}"),
                Err(e) => error!(error = %e, "failed to encode output record"),
            },
            Self::Capture(records) => lock(records).push(record),
        }
    }
}

// ─── Collaborators ───────────────────────────────────────────────

pub struct EmitterSink {
    emitter: Emitter,
    tag: String,
}

impl EmitterSink {
    pub fn new(emitter: Emitter, tag: impl Into<String>) -> Self {
        Self {
            emitter,
            tag: tag.into(),
        }
    }
}

impl NotificationSink for EmitterSink {
    fn notify(&mut self, notification_id: i32, notification: &Notification) {
        self.emitter.emit(OutputRecord::Notify {
            notification_id,
            notification: notification.clone(),
        });
    }

    fn cancel(&mut self, notification_id: i32) {
        self.emitter.emit(OutputRecord::Cancel {
            notification_id,
            tag: self.tag.clone(),
        });
    }
}

pub struct EmitterPicker {
    emitter: Emitter,
    tag: String,
}

impl EmitterPicker {
    pub fn new(emitter: Emitter, tag: impl Into<String>) -> Self {
        Self {
            emitter,
            tag: tag.into(),
        }
    }
}

impl NetworkPicker for EmitterPicker {
    fn open_network_picker(&mut self) {
        self.emitter.emit(OutputRecord::OpenPicker {
            tag: self.tag.clone(),
        });
    }
}

/// Hands out network ids and reports adds and connect requests. Clones
/// share the id counter.
#[derive(Clone)]
pub struct HostConnector {
    emitter: Emitter,
    next_id: Arc<AtomicI32>,
}

impl HostConnector {
    pub fn new(emitter: Emitter) -> Self {
        Self {
            emitter,
            next_id: Arc::new(AtomicI32::new(1)),
        }
    }
}

impl ConnectionInitiator for HostConnector {
    fn add_or_update_network(
        &mut self,
        config: &NetworkConfig,
        owner_uid: u32,
    ) -> Result<NetworkId, NotifierError> {
        let network_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!(ssid = %config.ssid, network_id, "network added");
        self.emitter.emit(OutputRecord::NetworkAdded {
            network_id,
            config: config.clone(),
            owner_uid,
        });
        Ok(network_id)
    }

    fn connect(&mut self, network_id: NetworkId) {
        self.emitter.emit(OutputRecord::Connect { network_id });
    }
}

/// Settings toggles shared between the feed and every notifier.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<Mutex<BTreeMap<String, bool>>>);

impl SharedSettings {
    pub fn new(initial: BTreeMap<String, bool>) -> Self {
        Self(Arc::new(Mutex::new(initial)))
    }

    pub fn set(&self, key: &str, enabled: bool) {
        lock(&self.0).insert(key.to_string(), enabled);
    }
}

impl SettingSource for SharedSettings {
    /// Toggles never written are on.
    fn is_enabled(&self, settings_key: &str) -> bool {
        lock(&self.0).get(settings_key).copied().unwrap_or(true)
    }
}

/// Wall clock anchored at creation and advanced by tokio's clock, so paused
/// test time moves it too.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin_ms: u64,
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(SystemClock.wall_clock_millis())
    }

    pub fn starting_at(origin_ms: u64) -> Self {
        Self {
            origin_ms,
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn wall_clock_millis(&self) -> u64 {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.origin_ms.saturating_add(elapsed)
    }
}
