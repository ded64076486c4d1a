//! The available-network notifier state machine.
//!
//! One [`NetworkNotifier`] per [`NotifierIdentity`]. Every public `handle_*`
//! method must be called from a single serialized queue; handlers run to
//! completion and never block. Timers are requested through
//! [`TimerScheduler`] and come back as [`NotifierEvent::Timer`]; a timer
//! whose generation or expected state no longer holds is a no-op.
//!
//! ```text
//!            scan (admitted, screen on, past repeat time)
//!   NoNotification ─────────────────────────────► Recommending
//!        ▲  ▲  ▲                                      │ connect action
//!        │  │  │ clear timer (reset repeat)           ▼
//!        │  │  └──────────── Connected ◄─ wifi ── Connecting
//!        │  │ clear timer                               │ failure / timeout
//!        │  └────────────── Failed ◄────────────────────┘
//!        └── dismiss / picker / admission revoked / any clear
//! ```

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::admission::{AdmissionPolicy, UserRestrictions};
use crate::blocklist::{Blocklist, BlocklistStore};
use crate::clock::Clock;
use crate::config::NotifierConfig;
use crate::metrics::NotifierMetrics;
use crate::network::WIFI_UID;
use crate::notification::NotificationKind;
use crate::ports::{
    ConnectionInitiator, NetworkPicker, NotificationBuilder, NotificationSink, SettingSource,
    TimerScheduler,
};
use crate::selector::recommend_network;
use crate::types::{
    ActionEvent, ActionKind, NotificationState, NotifierEvent, NotifierIdentity, NotifierTimer,
    ScanCandidate, TimerFired,
};

/// Collaborators injected into a notifier.
pub struct NotifierPorts {
    pub clock: Box<dyn Clock>,
    pub notifications: Box<dyn NotificationSink>,
    pub builder: Box<dyn NotificationBuilder>,
    pub connector: Box<dyn ConnectionInitiator>,
    pub picker: Box<dyn NetworkPicker>,
    pub scheduler: Box<dyn TimerScheduler>,
    pub store: Box<dyn BlocklistStore>,
    pub settings: Box<dyn SettingSource>,
    pub restrictions: Box<dyn UserRestrictions>,
    /// Whether the platform knows the "disallow add Wi-Fi config" restriction.
    pub supports_add_config_restriction: bool,
}

/// Point-in-time view of a notifier, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct NotifierDump {
    pub tag: String,
    pub setting_enabled: bool,
    pub current_time_ms: u64,
    pub repeat_at_ms: u64,
    pub state: NotificationState,
    pub recommended_ssid: Option<String>,
    pub blocklist: Vec<String>,
    pub metrics: NotifierMetrics,
}

pub struct NetworkNotifier {
    identity: NotifierIdentity,
    config: NotifierConfig,
    state: NotificationState,
    /// Held iff `state != NoNotification`.
    recommended: Option<ScanCandidate>,
    /// Wall-clock ms before which no fresh recommendation is posted from idle.
    repeat_at_ms: u64,
    blocklist: Blocklist,
    admission: AdmissionPolicy,
    metrics: NotifierMetrics,
    /// Bumped on every arm; fired timers from older arms are ignored.
    timer_generation: u64,

    clock: Box<dyn Clock>,
    notifications: Box<dyn NotificationSink>,
    builder: Box<dyn NotificationBuilder>,
    connector: Box<dyn ConnectionInitiator>,
    picker: Box<dyn NetworkPicker>,
    scheduler: Box<dyn TimerScheduler>,
    store: Box<dyn BlocklistStore>,
    settings: Box<dyn SettingSource>,
}

impl NetworkNotifier {
    /// Build a notifier, read the settings toggle and restore the persisted
    /// blocklist.
    pub fn new(identity: NotifierIdentity, config: NotifierConfig, ports: NotifierPorts) -> Self {
        let NotifierPorts {
            clock,
            notifications,
            builder,
            connector,
            picker,
            scheduler,
            store,
            settings,
            restrictions,
            supports_add_config_restriction,
        } = ports;

        let mut notifier = Self {
            identity,
            config,
            state: NotificationState::NoNotification,
            recommended: None,
            repeat_at_ms: 0,
            blocklist: Blocklist::new(),
            admission: AdmissionPolicy::new(restrictions, supports_add_config_restriction),
            metrics: NotifierMetrics::default(),
            timer_generation: 0,
            clock,
            notifications,
            builder,
            connector,
            picker,
            scheduler,
            store,
            settings,
        };

        notifier.read_setting();
        match notifier.store.load(&notifier.identity.store_key) {
            Ok(ssids) => notifier.restore_blocklist(ssids),
            Err(e) => warn!(
                tag = %notifier.identity.tag,
                error = %e,
                "failed to load blocklist, starting empty"
            ),
        }
        notifier
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn identity(&self) -> &NotifierIdentity {
        &self.identity
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn recommended(&self) -> Option<&ScanCandidate> {
        self.recommended.as_ref()
    }

    pub fn repeat_at_ms(&self) -> u64 {
        self.repeat_at_ms
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn metrics(&self) -> &NotifierMetrics {
        &self.metrics
    }

    pub fn is_setting_enabled(&self) -> bool {
        self.admission.setting_enabled()
    }

    pub fn is_screen_on(&self) -> bool {
        self.admission.screen_on()
    }

    pub fn dump(&self) -> NotifierDump {
        NotifierDump {
            tag: self.identity.tag.clone(),
            setting_enabled: self.admission.setting_enabled(),
            current_time_ms: self.clock.wall_clock_millis(),
            repeat_at_ms: self.repeat_at_ms,
            state: self.state,
            recommended_ssid: self.recommended.as_ref().map(|r| r.ssid.clone()),
            blocklist: self.blocklist.iter().map(str::to_string).collect(),
            metrics: self.metrics.clone(),
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: NotifierEvent) {
        match event {
            NotifierEvent::ScanResults { candidates } => self.handle_scan_results(&candidates),
            NotifierEvent::ScreenStateChanged { on } => self.handle_screen_state_changed(on),
            NotifierEvent::WifiConnected { ssid } => self.handle_wifi_connected(ssid.as_deref()),
            NotifierEvent::ConnectionFailure => self.handle_connection_failure(),
            NotifierEvent::ConnectionSendFailed { reason } => {
                self.handle_connection_send_failed(reason)
            }
            NotifierEvent::Action(action) => self.handle_action(&action),
            NotifierEvent::SettingChanged => self.handle_setting_changed(),
            NotifierEvent::ClearPending { reset_repeat_time } => {
                self.clear_pending_notification(reset_repeat_time)
            }
            NotifierEvent::Timer(fired) => self.handle_timer(fired),
            NotifierEvent::BlocklistRestored { ssids } => self.restore_blocklist(ssids),
        }
    }

    // ─── Scan Results ────────────────────────────────────────────

    /// Post, update or clear the recommendation for a fresh scan.
    pub fn handle_scan_results(&mut self, candidates: &[ScanCandidate]) {
        if !self.admission.is_enabled() {
            self.clear_pending_notification(true);
            return;
        }
        if candidates.is_empty() && self.state == NotificationState::Recommending {
            self.clear_pending_notification(false);
            return;
        }

        if self.state == NotificationState::NoNotification {
            // Not enough time has passed since the last recommendation.
            if self.clock.wall_clock_millis() < self.repeat_at_ms {
                return;
            }
            if !self.admission.screen_on() {
                return;
            }
        }

        if matches!(
            self.state,
            NotificationState::NoNotification | NotificationState::Recommending
        ) {
            match recommend_network(candidates, &self.blocklist).cloned() {
                Some(recommendation) => self.post_initial_notification(recommendation),
                None => self.clear_pending_notification(false),
            }
        }
    }

    fn post_initial_notification(&mut self, recommendation: ScanCandidate) {
        if self
            .recommended
            .as_ref()
            .is_some_and(|current| current.ssid == recommendation.ssid)
        {
            return;
        }

        self.post_notification(NotificationKind::RecommendNetwork, Some(&recommendation));
        if self.state == NotificationState::NoNotification {
            self.metrics
                .record_notification(NotificationKind::RecommendNetwork);
        } else {
            self.metrics.record_recommendation_update();
        }
        self.state = NotificationState::Recommending;
        self.recommended = Some(recommendation);
        self.repeat_at_ms = self
            .clock
            .wall_clock_millis()
            .saturating_add(self.config.repeat_delay_ms());
    }

    pub fn handle_screen_state_changed(&mut self, on: bool) {
        self.admission.set_screen_on(on);
    }

    // ─── Connection Outcomes ─────────────────────────────────────

    /// Wi-Fi connected to `ssid` (any network, not only the recommended one).
    pub fn handle_wifi_connected(&mut self, ssid: Option<&str>) {
        if let Some(ssid) = ssid {
            self.remove_network_from_blocklist(ssid);
        }
        if self.state != NotificationState::Connecting {
            self.clear_pending_notification(true);
            return;
        }
        let Some(recommendation) = self.recommended.clone() else {
            self.clear_pending_notification(true);
            return;
        };

        self.post_notification(NotificationKind::ConnectedToNetwork, Some(&recommendation));
        debug!(
            tag = %self.identity.tag,
            ssid = %recommendation.ssid,
            "user connected to recommended network"
        );
        self.metrics
            .record_notification(NotificationKind::ConnectedToNetwork);
        self.state = NotificationState::Connected;
        self.arm_timer(NotifierTimer::ConnectedShown);
    }

    /// A connection attempt failed. Only meaningful while connecting.
    pub fn handle_connection_failure(&mut self) {
        if self.state != NotificationState::Connecting {
            debug!(tag = %self.identity.tag, state = %self.state, "connection failure ignored");
            return;
        }
        let recommendation = self.recommended.clone();
        self.post_notification(NotificationKind::FailedToConnect, recommendation.as_ref());
        debug!(
            tag = %self.identity.tag,
            ssid = recommendation.as_ref().map(|r| r.ssid.as_str()).unwrap_or(""),
            "user failed to connect to recommended network"
        );
        self.metrics
            .record_notification(NotificationKind::FailedToConnect);
        self.state = NotificationState::Failed;
        self.arm_timer(NotifierTimer::FailedShown);
    }

    /// The connect request never reached the platform.
    pub fn handle_connection_send_failed(&mut self, reason: i32) {
        warn!(tag = %self.identity.tag, reason, "connect request failed to send");
        self.handle_connection_failure();
        self.metrics.record_connect_send_failure();
    }

    // ─── User Actions ────────────────────────────────────────────

    /// Handle an action from a notification. Actions for other tags are ignored.
    pub fn handle_action(&mut self, event: &ActionEvent) {
        if event.tag != self.identity.tag {
            debug!(
                tag = %self.identity.tag,
                action_tag = %event.tag,
                "action for another notifier ignored"
            );
            return;
        }
        match event.action {
            ActionKind::UserDismissed => self.handle_user_dismissed(),
            ActionKind::ConnectToNetwork => self.handle_connect_to_network(),
            ActionKind::PickWifiNetwork | ActionKind::PickWifiNetworkAfterFailure => {
                self.handle_pick_network(event.action)
            }
        }
    }

    fn handle_connect_to_network(&mut self) {
        self.metrics
            .record_action(ActionKind::ConnectToNetwork, self.state);
        if self.state != NotificationState::Recommending {
            debug!(tag = %self.identity.tag, state = %self.state, "connect action ignored");
            return;
        }
        let Some(recommendation) = self.recommended.clone() else {
            return;
        };

        self.post_notification(NotificationKind::ConnectingToNetwork, Some(&recommendation));
        self.metrics
            .record_notification(NotificationKind::ConnectingToNetwork);
        debug!(
            tag = %self.identity.tag,
            ssid = %recommendation.ssid,
            "user initiated connection to recommended network"
        );

        let Some(config) = self.connector.build_network_config(&recommendation) else {
            error!(
                tag = %self.identity.tag,
                ssid = %recommendation.ssid,
                "cannot create a network config from the scan record"
            );
            return;
        };

        match self.connector.add_or_update_network(&config, WIFI_UID) {
            Ok(network_id) => {
                self.metrics
                    .set_nominator(network_id, self.identity.nominator_id);
                self.connector.connect(network_id);
                self.add_network_to_blocklist(&recommendation.ssid);
            }
            // Left to the connecting timeout to turn into a failure.
            Err(e) => warn!(tag = %self.identity.tag, error = %e, "network add rejected"),
        }

        self.state = NotificationState::Connecting;
        self.arm_timer(NotifierTimer::ConnectingTimeout);
    }

    fn handle_user_dismissed(&mut self) {
        debug!(tag = %self.identity.tag, state = %self.state, "user dismissed notification");
        self.metrics
            .record_action(ActionKind::UserDismissed, self.state);
        if self.state == NotificationState::Recommending {
            if let Some(ssid) = self.recommended.as_ref().map(|r| r.ssid.clone()) {
                self.add_network_to_blocklist(&ssid);
            }
        }
        self.clear_pending_notification(false);
        self.repeat_at_ms = self
            .clock
            .wall_clock_millis()
            .saturating_add(self.config.repeat_delay_ms());
    }

    fn handle_pick_network(&mut self, action: ActionKind) {
        self.metrics.record_action(action, self.state);
        self.picker.open_network_picker();
        self.clear_pending_notification(false);
    }

    // ─── Settings & Timers ───────────────────────────────────────

    /// The settings toggle changed: re-read it and drop anything pending.
    pub fn handle_setting_changed(&mut self) {
        self.read_setting();
        self.clear_pending_notification(true);
    }

    fn read_setting(&mut self) {
        let enabled = self.settings.is_enabled(&self.identity.settings_key);
        self.admission.set_setting_enabled(enabled);
        self.metrics.set_setting_enabled(enabled);
        debug!(tag = %self.identity.tag, enabled, "settings toggle read");
    }

    pub fn handle_timer(&mut self, fired: TimerFired) {
        if fired.generation != self.timer_generation {
            debug!(tag = %self.identity.tag, timer = ?fired.timer, "stale timer ignored");
            return;
        }
        match fired.timer {
            NotifierTimer::ConnectingTimeout => {
                if self.state == NotificationState::Connecting {
                    self.handle_connection_failure();
                }
            }
            NotifierTimer::ConnectedShown => {
                if self.state == NotificationState::Connected {
                    self.clear_pending_notification(true);
                }
            }
            NotifierTimer::FailedShown => {
                if self.state == NotificationState::Failed {
                    self.clear_pending_notification(false);
                }
            }
        }
    }

    fn arm_timer(&mut self, timer: NotifierTimer) {
        let delay = match timer {
            NotifierTimer::ConnectingTimeout => self.config.connecting_timeout(),
            NotifierTimer::ConnectedShown => self.config.connected_display(),
            NotifierTimer::FailedShown => self.config.failed_display(),
        };
        self.timer_generation += 1;
        self.scheduler.schedule(
            delay,
            TimerFired {
                timer,
                generation: self.timer_generation,
            },
        );
    }

    // ─── Clearing ────────────────────────────────────────────────

    /// Cancel whatever is shown and return to `NoNotification`.
    ///
    /// `reset_repeat_time` also lifts the repeat delay so the next qualifying
    /// scan may recommend immediately.
    pub fn clear_pending_notification(&mut self, reset_repeat_time: bool) {
        if reset_repeat_time {
            self.repeat_at_ms = 0;
        }
        if self.state == NotificationState::NoNotification {
            return;
        }

        self.notifications.cancel(self.identity.notification_id);
        info!(tag = %self.identity.tag, "notification canceled");
        if let Some(recommendation) = &self.recommended {
            debug!(
                tag = %self.identity.tag,
                state = %self.state,
                ssid = %recommendation.ssid,
                "notification cleared for recommended network"
            );
        }
        self.state = NotificationState::NoNotification;
        self.recommended = None;
    }

    fn post_notification(&mut self, kind: NotificationKind, network: Option<&ScanCandidate>) {
        let notification = self.builder.build(kind, &self.identity.tag, network);
        self.notifications
            .notify(self.identity.notification_id, &notification);
        info!(tag = %self.identity.tag, kind = ?kind, "notification posted");
    }

    // ─── Blocklist ───────────────────────────────────────────────

    /// Merge SSIDs loaded from the store into the live blocklist.
    pub fn restore_blocklist<I, S>(&mut self, ssids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = self.blocklist.merge(ssids);
        self.metrics.set_blocklist_size(self.blocklist.len());
        debug!(
            tag = %self.identity.tag,
            added,
            total = self.blocklist.len(),
            "blocklist restored"
        );
    }

    fn add_network_to_blocklist(&mut self, ssid: &str) {
        self.blocklist.add(ssid);
        self.metrics.set_blocklist_size(self.blocklist.len());
        self.persist_blocklist();
        debug!(tag = %self.identity.tag, ssid, "network added to blocklist");
    }

    fn remove_network_from_blocklist(&mut self, ssid: &str) {
        if !self.blocklist.remove(ssid) {
            return;
        }
        self.metrics.set_blocklist_size(self.blocklist.len());
        self.persist_blocklist();
        debug!(tag = %self.identity.tag, ssid, "network removed from blocklist");
    }

    fn persist_blocklist(&mut self) {
        if let Err(e) = self
            .store
            .save(&self.identity.store_key, &self.blocklist.snapshot())
        {
            warn!(tag = %self.identity.tag, error = %e, "failed to persist blocklist");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
