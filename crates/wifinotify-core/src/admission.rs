//! Admission policy: the settings toggle combined with per-user platform
//! restrictions. Re-evaluated on every call; nothing here is cached except
//! the toggle value last reported by the setting observer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRestriction {
    /// The user may not change Wi-Fi configuration at all.
    DisallowConfigWifi,
    /// The user may not add new Wi-Fi configurations.
    DisallowAddWifiConfig,
}

/// Platform lookup for the foreground user and their restrictions.
pub trait UserRestrictions: Send {
    fn current_user(&self) -> u32;
    fn has_restriction(&self, user: u32, restriction: UserRestriction) -> bool;
}

/// No user is ever restricted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRestrictions;

impl UserRestrictions for NoRestrictions {
    fn current_user(&self) -> u32 {
        0
    }

    fn has_restriction(&self, _user: u32, _restriction: UserRestriction) -> bool {
        false
    }
}

/// Fixed restriction table, e.g. read from configuration.
#[derive(Debug, Default, Clone)]
pub struct StaticRestrictions {
    pub current_user: u32,
    pub restricted: HashSet<(u32, UserRestriction)>,
}

impl StaticRestrictions {
    pub fn new(current_user: u32) -> Self {
        Self {
            current_user,
            restricted: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, user: u32, restriction: UserRestriction) -> Self {
        self.restricted.insert((user, restriction));
        self
    }
}

impl UserRestrictions for StaticRestrictions {
    fn current_user(&self) -> u32 {
        self.current_user
    }

    fn has_restriction(&self, user: u32, restriction: UserRestriction) -> bool {
        self.restricted.contains(&(user, restriction))
    }
}

// ─── Policy ──────────────────────────────────────────────────────

pub struct AdmissionPolicy {
    setting_enabled: bool,
    screen_on: bool,
    /// Whether the platform knows the "disallow add Wi-Fi config" restriction.
    supports_add_config_restriction: bool,
    restrictions: Box<dyn UserRestrictions>,
}

impl AdmissionPolicy {
    pub fn new(restrictions: Box<dyn UserRestrictions>, supports_add_config_restriction: bool) -> Self {
        Self {
            setting_enabled: false,
            screen_on: false,
            supports_add_config_restriction,
            restrictions,
        }
    }

    /// Whether the notifier may act right now.
    pub fn is_enabled(&self) -> bool {
        if !self.setting_enabled {
            return false;
        }
        let user = self.restrictions.current_user();
        if self
            .restrictions
            .has_restriction(user, UserRestriction::DisallowConfigWifi)
        {
            return false;
        }
        !(self.supports_add_config_restriction
            && self
                .restrictions
                .has_restriction(user, UserRestriction::DisallowAddWifiConfig))
    }

    pub fn setting_enabled(&self) -> bool {
        self.setting_enabled
    }

    pub fn set_setting_enabled(&mut self, enabled: bool) {
        self.setting_enabled = enabled;
    }

    pub fn screen_on(&self) -> bool {
        self.screen_on
    }

    pub fn set_screen_on(&mut self, on: bool) {
        self.screen_on = on;
    }
}

impl std::fmt::Debug for AdmissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionPolicy")
            .field("setting_enabled", &self.setting_enabled)
            .field("screen_on", &self.screen_on)
            .field(
                "supports_add_config_restriction",
                &self.supports_add_config_restriction,
            )
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
