//! Storage seam shared by the stopwatch store and the event lock.
//!
//! Both components only ever need three primitives: an atomic
//! set-if-absent, an atomic get-and-delete, and a non-blocking exclusive
//! acquire with expiry. Keeping those behind one trait lets the local and
//! shared variants swap without touching either component; only the fault
//! domain and the deduplication scope change.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;

/// Minimal storage contract for the coordination core.
///
/// Implementations must make each method atomic with respect to concurrent
/// callers on the same key. Components never combine a read with a
/// dependent write against shared state; that would reopen the races these
/// primitives exist to close.
#[async_trait]
pub trait CoordinationBackend: Send + Sync {
    /// Atomically store `value` under `key` if no value exists yet.
    ///
    /// Returns `true` when this call created the entry.
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, BackendError>;

    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Atomically read and remove the value under `key`.
    ///
    /// Of two racing calls, exactly one observes the value.
    async fn take(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Single-shot exclusive acquire of `key` with store-side expiry.
    ///
    /// Never blocks or retries. `true` means this caller holds the slot
    /// until `ttl` elapses; there is no release path, the grant simply
    /// expires.
    async fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool, BackendError>;
}
