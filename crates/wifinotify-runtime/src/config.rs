//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! store_path = "/var/lib/wifinotify/blocklist.db"
//!
//! [settings]
//! wifi_networks_available_notification_on = true
//!
//! [timing]
//! repeat_delay_secs = 900
//!
//! [restrictions]
//! current_user = 0
//! rules = [{ user = 10, restriction = "disallow_config_wifi" }]
//!
//! [[notifiers]]
//! tag = "WifiOpenNetworkNotifier"
//! store_key = "OpenNetworkNotifierBlacklist"
//! settings_key = "wifi_networks_available_notification_on"
//! notification_id = 17
//! nominator_id = 9
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use wifinotify_core::{NotifierConfig, NotifierIdentity, StaticRestrictions, UserRestriction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Initial value of each settings toggle, by settings key. Missing keys are on.
    pub settings: BTreeMap<String, bool>,
    pub timing: NotifierConfig,
    pub restrictions: RestrictionConfig,
    pub notifiers: Vec<NotifierIdentity>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            settings: BTreeMap::new(),
            timing: NotifierConfig::default(),
            restrictions: RestrictionConfig::default(),
            notifiers: vec![NotifierIdentity::open_networks()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictionConfig {
    pub current_user: u32,
    /// Whether the platform knows the "disallow add Wi-Fi config" restriction.
    pub supports_add_config_restriction: bool,
    pub rules: Vec<RestrictionRule>,
}

impl Default for RestrictionConfig {
    fn default() -> Self {
        Self {
            current_user: 0,
            supports_add_config_restriction: true,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionRule {
    pub user: u32,
    pub restriction: UserRestriction,
}

impl RestrictionConfig {
    pub fn to_restrictions(&self) -> StaticRestrictions {
        self.rules
            .iter()
            .fold(StaticRestrictions::new(self.current_user), |acc, rule| {
                acc.with(rule.user, rule.restriction)
            })
    }
}

impl RuntimeConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml(&text)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => {
                Err(e).with_context(|| format!("failed to read config file {}", path.display()))
            }
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn setting_enabled(&self, settings_key: &str) -> bool {
        self.settings.get(settings_key).copied().unwrap_or(true)
    }

    /// Store path: explicit override, then the config file, then the default.
    pub fn resolve_store_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.store_path.clone())
            .unwrap_or_else(default_store_path)
    }
}

/// `$XDG_CONFIG_HOME/wifinotify/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("wifinotify/config.toml"));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config/wifinotify/config.toml"))
}

/// `$XDG_DATA_HOME/wifinotify/blocklist.db`, falling back to `~/.local/share`
/// and then a per-user directory under /tmp.
pub fn default_store_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(dir).join("wifinotify/blocklist.db");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/share/wifinotify/blocklist.db");
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/wifinotify-{user}/blocklist.db"))
}
