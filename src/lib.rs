//! Coordination core for a chat-triggered command responder.
//!
//! Two pieces carry the engineering weight here: an event-admission lock
//! that keeps duplicate deliveries of one chat message from being processed
//! twice, and a per-user stopwatch store whose create/read/consume
//! operations stay race-free under concurrent delivery. Both sit on a
//! narrow storage trait with an in-process implementation (scope: one
//! instance) and a Redis implementation (scope: every instance sharing the
//! store).

pub mod backend;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event_lock;
pub mod stopwatch;

pub use backend::CoordinationBackend;
pub use dispatcher::{CommandToken, Dispatcher, InboundEvent};
pub use error::BackendError;
pub use event_lock::{Admission, EventLock};
pub use stopwatch::{LapOutcome, StartOutcome, StopwatchStore};
