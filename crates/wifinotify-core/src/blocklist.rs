//! SSID blocklist and the persistence seam behind it.
//!
//! The in-memory [`Blocklist`] is authoritative at runtime. A
//! [`BlocklistStore`] keeps one named string-set per notifier; loads are
//! merged into the live set, never replacing entries already present.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

// ─── Blocklist ───────────────────────────────────────────────────

/// Set of SSIDs excluded from recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    ssids: BTreeSet<String>,
}

impl Blocklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an SSID. Returns `false` if it was already present.
    pub fn add(&mut self, ssid: impl Into<String>) -> bool {
        self.ssids.insert(ssid.into())
    }

    /// Remove an SSID. Returns `false` if it was not present.
    pub fn remove(&mut self, ssid: &str) -> bool {
        self.ssids.remove(ssid)
    }

    pub fn contains(&self, ssid: &str) -> bool {
        self.ssids.contains(ssid)
    }

    /// Union `ssids` into the set. Returns how many were new.
    pub fn merge<I, S>(&mut self, ssids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.ssids.len();
        self.ssids.extend(ssids.into_iter().map(Into::into));
        self.ssids.len() - before
    }

    pub fn len(&self) -> usize {
        self.ssids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ssids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ssids.iter().map(String::as_str)
    }

    /// Copy of the current contents, as handed to the store.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.ssids.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for Blocklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut blocklist = Self::new();
        blocklist.merge(iter);
        blocklist
    }
}

// ─── Store Seam ──────────────────────────────────────────────────

/// Durable key-value store of named SSID sets.
pub trait BlocklistStore: Send {
    /// Load the set saved under `key`. A key never saved loads as empty.
    fn load(&self, key: &str) -> Result<BTreeSet<String>, StoreError>;

    /// Replace the set saved under `key`.
    fn save(&mut self, key: &str, ssids: &BTreeSet<String>) -> Result<(), StoreError>;
}

/// In-process store. Clones share the same backing map, so a test can keep
/// a handle and inspect what the notifier persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlocklistStore {
    sets: Arc<Mutex<HashMap<String, BTreeSet<String>>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryBlocklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if saved by an earlier process.
    #[must_use]
    pub fn with_set<I, S>(self, key: &str, ssids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut sets) = self.sets.lock() {
            sets.insert(key.to_string(), ssids.into_iter().map(Into::into).collect());
        }
        self
    }

    pub fn get(&self, key: &str) -> BTreeSet<String> {
        self.sets
            .lock()
            .ok()
            .and_then(|sets| sets.get(key).cloned())
            .unwrap_or_default()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl BlocklistStore for MemoryBlocklistStore {
    fn load(&self, key: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, ssids: &BTreeSet<String>) -> Result<(), StoreError> {
        if let Ok(mut sets) = self.sets.lock() {
            sets.insert(key.to_string(), ssids.clone());
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
