//! Connectable network configs built from scan records.

use serde::{Deserialize, Serialize};

use crate::types::ScanCandidate;

/// Identifier assigned by the network config store.
pub type NetworkId = i32;

/// Owner uid recorded when the notifier adds a network on the user's behalf.
pub const WIFI_UID: u32 = 1010;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityType {
    Open,
    Owe,
    Psk,
    Sae,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: String,
    pub security: SecurityType,
}

impl NetworkConfig {
    /// Build a config from a scan record.
    ///
    /// Returns `None` for an empty SSID and for security types a
    /// notification cannot complete on its own (enterprise/EAP, WEP).
    pub fn from_scan(candidate: &ScanCandidate) -> Option<Self> {
        if candidate.ssid.is_empty() {
            return None;
        }
        let security = security_from_capabilities(&candidate.capabilities)?;
        Some(Self {
            ssid: candidate.ssid.clone(),
            security,
        })
    }
}

/// Classify capability flags. Strongest matching type wins.
fn security_from_capabilities(capabilities: &str) -> Option<SecurityType> {
    let caps = capabilities.to_ascii_uppercase();
    if caps.contains("EAP") || caps.contains("WEP") {
        return None;
    }
    if caps.contains("SAE") {
        Some(SecurityType::Sae)
    } else if caps.contains("PSK") {
        Some(SecurityType::Psk)
    } else if caps.contains("OWE") {
        Some(SecurityType::Owe)
    } else {
        Some(SecurityType::Open)
    }
}
