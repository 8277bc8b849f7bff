//! Per-user stopwatch store.
//!
//! One entry per owner: created by `start`, read by `lap`, consumed by
//! `stop`. Creation is a single set-if-absent against the backend, so when
//! two starts race exactly one timestamp is persisted and the loser sees
//! `AlreadyRunning`. Stops race through the atomic take; the loser finds
//! nothing and reports `NotRunning`, which is benign rather than an error.
//!
//! Entries have no TTL. A forgotten running stopwatch leaks one small
//! record for its owner and nothing else.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::backend::CoordinationBackend;
use crate::clock;
use crate::error::BackendError;

/// Outcome of a start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No timer existed; this call created one.
    Started,
    /// A timer is already running for this owner.
    AlreadyRunning,
}

/// Outcome of a lap or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapOutcome {
    /// Elapsed wall-clock time since the timer started.
    Running(Duration),
    /// No timer is running for this owner.
    NotRunning,
}

/// Store owning all per-user timer entries. Nothing else reads or writes
/// them.
#[derive(Clone)]
pub struct StopwatchStore {
    backend: Arc<dyn CoordinationBackend>,
}

impl StopwatchStore {
    pub fn new(backend: Arc<dyn CoordinationBackend>) -> Self {
        Self { backend }
    }

    /// Start a stopwatch for `owner`.
    ///
    /// The existence test and the write are one indivisible backend call;
    /// of any number of concurrent starts exactly one returns `Started`.
    pub async fn start(&self, owner: &str) -> Result<StartOutcome, BackendError> {
        let now = clock::unix_now_secs()?;
        let created = self.backend.put_if_absent(owner, &now.to_string()).await?;
        if created {
            Ok(StartOutcome::Started)
        } else {
            Ok(StartOutcome::AlreadyRunning)
        }
    }

    /// Read the current elapsed time without touching the entry.
    pub async fn lap(&self, owner: &str) -> Result<LapOutcome, BackendError> {
        match self.backend.get(owner).await? {
            Some(raw) => Ok(LapOutcome::Running(elapsed_since(owner, &raw)?)),
            None => Ok(LapOutcome::NotRunning),
        }
    }

    /// Stop the stopwatch and report the final elapsed time, computed at
    /// the moment of removal. A stop that loses the race to a concurrent
    /// stop sees `NotRunning`.
    pub async fn stop(&self, owner: &str) -> Result<LapOutcome, BackendError> {
        match self.backend.take(owner).await? {
            Some(raw) => Ok(LapOutcome::Running(elapsed_since(owner, &raw)?)),
            None => Ok(LapOutcome::NotRunning),
        }
    }
}

fn elapsed_since(owner: &str, raw: &str) -> Result<Duration, BackendError> {
    let started: u64 = raw.parse().map_err(|_| {
        warn!(owner, value = raw, "stored stopwatch timestamp failed to parse");
        BackendError::MalformedTimestamp {
            value: raw.to_string(),
        }
    })?;
    let now = clock::unix_now_secs()?;
    // Clock skew can make `started` read in the future; saturate rather
    // than underflow.
    Ok(Duration::from_secs(now.saturating_sub(started)))
}
