//! Error types for the notifier core and its persistence boundary.

use thiserror::Error;

/// Failure of the durable key-value store backing the blocklist.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the backing database.
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum NotifierError {
    /// The network config store refused the recommended network.
    #[error("network {ssid:?} rejected by config store: {reason}")]
    NetworkRejected { ssid: String, reason: String },

    #[error("unknown notification action: {0}")]
    UnknownAction(String),
}
