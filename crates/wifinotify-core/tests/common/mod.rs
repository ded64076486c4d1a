#![allow(dead_code)]

//! Recording fakes and a harness that drives a notifier with a manual clock
//! and a timer queue fired by advancing that clock.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wifinotify_core::{
    ActionEvent, ActionKind, ConnectionInitiator, DefaultNotificationBuilder, ManualClock,
    MemoryBlocklistStore, NetworkConfig, NetworkId, NetworkNotifier, NetworkPicker, Notification,
    NotificationKind, NotificationSink, NotificationState, NotifierConfig, NotifierError,
    NotifierEvent, NotifierIdentity, NotifierPorts, ScanCandidate, SettingSource,
    StaticRestrictions, TimerFired, TimerScheduler, UserRestriction,
};

pub const T0: u64 = 1_700_000_000_000;

// ─── Fakes ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Notify {
        id: i32,
        kind: NotificationKind,
        ssid: Option<String>,
    },
    Cancel {
        id: i32,
    },
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    ops: Arc<Mutex<Vec<SinkOp>>>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification_id: i32, notification: &Notification) {
        self.ops.lock().unwrap().push(SinkOp::Notify {
            id: notification_id,
            kind: notification.kind,
            ssid: notification.ssid.clone(),
        });
    }

    fn cancel(&mut self, notification_id: i32) {
        self.ops
            .lock()
            .unwrap()
            .push(SinkOp::Cancel { id: notification_id });
    }
}

#[derive(Debug, Default)]
pub struct ConnectorLog {
    pub added: Vec<(NetworkConfig, u32)>,
    pub connected: Vec<NetworkId>,
}

#[derive(Clone, Default)]
pub struct RecordingConnector {
    log: Arc<Mutex<ConnectorLog>>,
    reject_add: bool,
    unconvertible: bool,
}

impl ConnectionInitiator for RecordingConnector {
    fn build_network_config(&self, candidate: &ScanCandidate) -> Option<NetworkConfig> {
        if self.unconvertible {
            return None;
        }
        NetworkConfig::from_scan(candidate)
    }

    fn add_or_update_network(
        &mut self,
        config: &NetworkConfig,
        owner_uid: u32,
    ) -> Result<NetworkId, NotifierError> {
        if self.reject_add {
            return Err(NotifierError::NetworkRejected {
                ssid: config.ssid.clone(),
                reason: "config store full".into(),
            });
        }
        let mut log = self.log.lock().unwrap();
        log.added.push((config.clone(), owner_uid));
        Ok(log.added.len() as NetworkId)
    }

    fn connect(&mut self, network_id: NetworkId) {
        self.log.lock().unwrap().connected.push(network_id);
    }
}

#[derive(Clone, Default)]
pub struct CountingPicker(Arc<AtomicUsize>);

impl NetworkPicker for CountingPicker {
    fn open_network_picker(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Timers queued with their absolute due time on the manual clock.
#[derive(Clone)]
pub struct QueuedScheduler {
    clock: ManualClock,
    pending: Arc<Mutex<Vec<(u64, Duration, TimerFired)>>>,
}

impl TimerScheduler for QueuedScheduler {
    fn schedule(&mut self, delay: Duration, fired: TimerFired) {
        use wifinotify_core::Clock;
        let due = self.clock.wall_clock_millis() + delay.as_millis() as u64;
        self.pending.lock().unwrap().push((due, delay, fired));
    }
}

#[derive(Clone)]
pub struct SharedSetting(Arc<AtomicBool>);

impl SettingSource for SharedSetting {
    fn is_enabled(&self, _settings_key: &str) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─── Harness ─────────────────────────────────────────────────────

pub struct Options {
    pub setting_enabled: bool,
    pub screen_on: bool,
    pub reject_add: bool,
    pub unconvertible: bool,
    pub restricted: bool,
    pub saved_blocklist: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            setting_enabled: true,
            screen_on: true,
            reject_add: false,
            unconvertible: false,
            restricted: false,
            saved_blocklist: Vec::new(),
        }
    }
}

pub struct Harness {
    pub notifier: NetworkNotifier,
    pub identity: NotifierIdentity,
    pub clock: ManualClock,
    pub store: MemoryBlocklistStore,
    sink: RecordingSink,
    connector: RecordingConnector,
    picker: CountingPicker,
    setting: Arc<AtomicBool>,
    timers: Arc<Mutex<Vec<(u64, Duration, TimerFired)>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(Options::default())
    }

    pub fn with(options: Options) -> Self {
        let identity = NotifierIdentity::open_networks();
        let clock = ManualClock::new(T0);
        let store = MemoryBlocklistStore::new()
            .with_set(&identity.store_key, options.saved_blocklist.iter().cloned());
        let sink = RecordingSink::default();
        let connector = RecordingConnector {
            reject_add: options.reject_add,
            unconvertible: options.unconvertible,
            ..RecordingConnector::default()
        };
        let picker = CountingPicker::default();
        let setting = Arc::new(AtomicBool::new(options.setting_enabled));
        let timers = Arc::new(Mutex::new(Vec::new()));

        let mut restrictions = StaticRestrictions::new(10);
        if options.restricted {
            restrictions = restrictions.with(10, UserRestriction::DisallowConfigWifi);
        }

        let ports = NotifierPorts {
            clock: Box::new(clock.clone()),
            notifications: Box::new(sink.clone()),
            builder: Box::new(DefaultNotificationBuilder),
            connector: Box::new(connector.clone()),
            picker: Box::new(picker.clone()),
            scheduler: Box::new(QueuedScheduler {
                clock: clock.clone(),
                pending: Arc::clone(&timers),
            }),
            store: Box::new(store.clone()),
            settings: Box::new(SharedSetting(Arc::clone(&setting))),
            restrictions: Box::new(restrictions),
            supports_add_config_restriction: true,
        };

        let mut notifier = NetworkNotifier::new(identity.clone(), NotifierConfig::default(), ports);
        notifier.handle_screen_state_changed(options.screen_on);

        Self {
            notifier,
            identity,
            clock,
            store,
            sink,
            connector,
            picker,
            setting,
            timers,
        }
    }

    // ─── Inputs ──────────────────────────────────────────────────

    pub fn scan(&mut self, entries: &[(&str, i32)]) {
        let candidates: Vec<ScanCandidate> = entries
            .iter()
            .map(|(ssid, rssi)| ScanCandidate::new(*ssid, *rssi))
            .collect();
        self.notifier.handle_scan_results(&candidates);
    }

    pub fn action(&mut self, action: ActionKind) {
        let event = ActionEvent::new(self.identity.tag.clone(), action);
        self.notifier.handle_action(&event);
    }

    pub fn event(&mut self, event: NotifierEvent) {
        self.notifier.handle_event(event);
    }

    pub fn set_setting(&mut self, enabled: bool) {
        self.setting.store(enabled, Ordering::SeqCst);
        self.notifier.handle_setting_changed();
    }

    /// Advance the clock, firing every timer that comes due on the way, in
    /// due order. Timers armed by a firing timer are honoured too.
    pub fn advance(&mut self, ms: u64) {
        let target = wifinotify_core::Clock::wall_clock_millis(&self.clock) + ms;
        loop {
            let next = {
                let mut pending = self.timers.lock().unwrap();
                pending.sort_by_key(|(due, _, _)| *due);
                match pending.first() {
                    Some((due, _, _)) if *due <= target => Some(pending.remove(0)),
                    _ => None,
                }
            };
            let Some((due, _, fired)) = next else {
                break;
            };
            self.clock.set(due);
            self.notifier.handle_timer(fired);
        }
        self.clock.set(target);
    }

    // ─── Observations ────────────────────────────────────────────

    pub fn state(&self) -> NotificationState {
        self.notifier.state()
    }

    pub fn now(&self) -> u64 {
        wifinotify_core::Clock::wall_clock_millis(&self.clock)
    }

    pub fn ops(&self) -> Vec<SinkOp> {
        self.sink.ops.lock().unwrap().clone()
    }

    /// Kinds of every notification posted so far, in order.
    pub fn posted(&self) -> Vec<NotificationKind> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                SinkOp::Notify { kind, .. } => Some(kind),
                SinkOp::Cancel { .. } => None,
            })
            .collect()
    }

    pub fn cancels(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, SinkOp::Cancel { .. }))
            .count()
    }

    pub fn pending_timers(&self) -> Vec<(Duration, TimerFired)> {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, delay, fired)| (*delay, *fired))
            .collect()
    }

    pub fn added_networks(&self) -> Vec<String> {
        self.connector
            .log
            .lock()
            .unwrap()
            .added
            .iter()
            .map(|(config, _)| config.ssid.clone())
            .collect()
    }

    pub fn owner_uids(&self) -> Vec<u32> {
        self.connector
            .log
            .lock()
            .unwrap()
            .added
            .iter()
            .map(|(_, uid)| *uid)
            .collect()
    }

    pub fn connected_ids(&self) -> Vec<NetworkId> {
        self.connector.log.lock().unwrap().connected.clone()
    }

    pub fn picker_opens(&self) -> usize {
        self.picker.0.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> BTreeSet<String> {
        self.store.get(&self.identity.store_key)
    }
}
