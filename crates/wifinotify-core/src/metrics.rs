//! Per-notifier counters and gauges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::network::NetworkId;
use crate::notification::NotificationKind;
use crate::types::{ActionKind, NotificationState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierMetrics {
    /// Notifications posted, by kind. Recommendation updates are not counted here.
    pub notifications: BTreeMap<NotificationKind, u64>,
    /// User actions, by action and the state the notifier was in when it arrived.
    pub actions: BTreeMap<ActionKind, BTreeMap<NotificationState, u64>>,
    /// Times a shown recommendation was replaced by a different network.
    pub recommendation_updates: u64,
    pub blocklist_size: usize,
    /// Connection requests that could not be dispatched.
    pub connect_send_failures: u64,
    pub setting_enabled: bool,
    /// Networks added from a notification, mapped to the nominator that added them.
    pub nominators: BTreeMap<NetworkId, i32>,
}

impl NotifierMetrics {
    pub fn record_notification(&mut self, kind: NotificationKind) {
        *self.notifications.entry(kind).or_default() += 1;
    }

    pub fn record_action(&mut self, action: ActionKind, state: NotificationState) {
        *self
            .actions
            .entry(action)
            .or_default()
            .entry(state)
            .or_default() += 1;
    }

    pub fn record_recommendation_update(&mut self) {
        self.recommendation_updates += 1;
    }

    pub fn record_connect_send_failure(&mut self) {
        self.connect_send_failures += 1;
    }

    pub fn set_blocklist_size(&mut self, size: usize) {
        self.blocklist_size = size;
    }

    pub fn set_setting_enabled(&mut self, enabled: bool) {
        self.setting_enabled = enabled;
    }

    pub fn set_nominator(&mut self, network_id: NetworkId, nominator_id: i32) {
        self.nominators.insert(network_id, nominator_id);
    }

    pub fn notification_count(&self, kind: NotificationKind) -> u64 {
        self.notifications.get(&kind).copied().unwrap_or(0)
    }

    /// Count of `action` across all states.
    pub fn action_count(&self, action: ActionKind) -> u64 {
        self.actions
            .get(&action)
            .map(|by_state| by_state.values().sum())
            .unwrap_or(0)
    }

    pub fn action_count_in(&self, action: ActionKind, state: NotificationState) -> u64 {
        self.actions
            .get(&action)
            .and_then(|by_state| by_state.get(&state))
            .copied()
            .unwrap_or(0)
    }
}
