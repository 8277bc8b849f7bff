//! Error types for the coordination core.
//!
//! Contention ("already running", "lock denied") and not-found are normal
//! outcomes and never appear here; the error channel is reserved for
//! infrastructure failures and corrupt persisted state.

use thiserror::Error;

/// Errors surfaced by a storage backend or by operations built on one.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backing store could not be reached or rejected the operation.
    #[error("backend unavailable: {source}")]
    Unavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted timestamp failed to parse. Affects the one operation
    /// that read it; the entry itself is left alone.
    #[error("malformed stored timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    /// The system clock reads before the UNIX epoch.
    #[error("clock skew: system time before UNIX epoch")]
    ClockSkew,
}
