//! Event deduplication lock.
//!
//! One probe per inbound event: the first caller to claim the event id
//! owns processing for the TTL window, everyone else is turned away. There
//! is no queueing, no retry and no release; the grant simply expires. The
//! same chat message delivered twice must be handled once, and ten seconds
//! of exclusivity is all that takes.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::backend::CoordinationBackend;

/// Default grant lifetime. Long enough to cover handling one chat command,
/// short enough that an abandoned grant frees quickly.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Outcome of an admission probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// This caller is first; it may process the event.
    Granted,
    /// The event is already being handled, or the store was unreachable.
    Denied,
}

/// Grants at most one processing slot per event id within the TTL window.
#[derive(Clone)]
pub struct EventLock {
    backend: Arc<dyn CoordinationBackend>,
    ttl: Duration,
}

impl EventLock {
    pub fn new(backend: Arc<dyn CoordinationBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Probe for the right to process `event_id`. Never blocks.
    ///
    /// A backend failure is answered with `Denied`: dropping a
    /// duplicate-suspect event is acceptable, processing one twice is not.
    pub async fn admit(&self, event_id: &str) -> Admission {
        match self.backend.try_lock(event_id, self.ttl).await {
            Ok(true) => {
                debug!(event_id, "admitted event");
                Admission::Granted
            }
            Ok(false) => Admission::Denied,
            Err(error) => {
                warn!(event_id, %error, "lock probe failed, denying event");
                Admission::Denied
            }
        }
    }
}
