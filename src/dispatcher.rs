//! Command dispatcher.
//!
//! Routes a recognized command token through the event lock and the
//! stopwatch store and renders the response text. The mapping from store
//! outcomes to strings is pure; all state lives behind the injected
//! backend.
//!
//! One event's lifecycle: received, then admitted or rejected as a
//! duplicate; only the admitted path touches the store and emits at most
//! one response.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tracing::debug;
use tracing::warn;

use crate::backend::CoordinationBackend;
use crate::error::BackendError;
use crate::event_lock::Admission;
use crate::event_lock::EventLock;
use crate::stopwatch::LapOutcome;
use crate::stopwatch::StartOutcome;
use crate::stopwatch::StopwatchStore;

/// Commands the responder recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandToken {
    Help,
    Uptime,
    Version,
    SwStart,
    SwLap,
    SwStop,
}

impl CommandToken {
    /// Parse a dot-prefixed chat token. Anything else is not a command.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ".help" => Some(Self::Help),
            ".uptime" => Some(Self::Uptime),
            ".version" => Some(Self::Version),
            ".swstart" => Some(Self::SwStart),
            ".swlap" => Some(Self::SwLap),
            ".swstop" => Some(Self::SwStop),
            _ => None,
        }
    }

    /// Whether a duplicate delivery of this command would duplicate a side
    /// effect worth guarding against. Uptime and version answers are
    /// harmless to repeat.
    fn dedup_sensitive(self) -> bool {
        matches!(self, Self::Help | Self::SwStart | Self::SwLap | Self::SwStop)
    }
}

/// One inbound unit of work handed over by the transport.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Transport-assigned id, unique per delivery attempt's logical event.
    pub event_id: String,
    /// Stable id of the message author; stopwatch owner.
    pub author_id: String,
    pub command: CommandToken,
    /// True when the author is this process or any other bot.
    pub from_bot: bool,
}

const HELP_TEXT: &str = "available commands are:\n\
    * .help: this information\n\
    * .swstart: start stopwatch timer\n\
    * .swlap: show current stopwatch time\n\
    * .swstop: stop stopwatch and show final time\n\
    * .uptime: the responder uptime\n\
    * .version: the responder version";

/// Routes admitted events to the stopwatch store and renders responses.
pub struct Dispatcher {
    stopwatch: StopwatchStore,
    lock: EventLock,
    /// Display label for this process, hostname in production.
    identity: String,
    started: Instant,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn CoordinationBackend>, lock_ttl: Duration, identity: String) -> Self {
        Self {
            stopwatch: StopwatchStore::new(backend.clone()),
            lock: EventLock::new(backend, lock_ttl),
            identity,
            started: Instant::now(),
        }
    }

    /// Process one inbound event.
    ///
    /// `None` means no response is owed: the author was a bot, or the
    /// event lost the admission race and is being handled elsewhere. The
    /// duplicate case is dropped silently on purpose; the granted path
    /// already answers the user.
    pub async fn dispatch(&self, event: &InboundEvent) -> Option<String> {
        if event.from_bot {
            return None;
        }

        if event.command.dedup_sensitive()
            && self.lock.admit(&event.event_id).await == Admission::Denied
        {
            debug!(event_id = %event.event_id, "dropping duplicate event");
            return None;
        }

        Some(match event.command {
            CommandToken::Help => HELP_TEXT.to_string(),
            CommandToken::Uptime => format!(
                "{} uptime: {}",
                self.identity,
                render_duration(self.started.elapsed())
            ),
            CommandToken::Version => {
                format!("{} version: {}", self.identity, env!("CARGO_PKG_VERSION"))
            }
            CommandToken::SwStart => self.handle_start(event).await,
            CommandToken::SwLap => self.handle_lap(event).await,
            CommandToken::SwStop => self.handle_stop(event).await,
        })
    }

    async fn handle_start(&self, event: &InboundEvent) -> String {
        match self.stopwatch.start(&event.author_id).await {
            Ok(StartOutcome::Started) => {
                format!("{}: stopwatch started", event.author_id)
            }
            Ok(StartOutcome::AlreadyRunning) => format!(
                "{}: stopwatch already running, stop with `.swstop`",
                event.author_id
            ),
            Err(error) => self.store_failure(event, "start", &error),
        }
    }

    async fn handle_lap(&self, event: &InboundEvent) -> String {
        match self.stopwatch.lap(&event.author_id).await {
            Ok(LapOutcome::Running(elapsed)) => format!(
                "{}: stopwatch lap time: {}",
                event.author_id,
                render_duration(elapsed)
            ),
            Ok(LapOutcome::NotRunning) => not_running(&event.author_id),
            Err(error) => self.store_failure(event, "lap", &error),
        }
    }

    async fn handle_stop(&self, event: &InboundEvent) -> String {
        match self.stopwatch.stop(&event.author_id).await {
            Ok(LapOutcome::Running(elapsed)) => format!(
                "{}: stopwatch stopped, final time: {}",
                event.author_id,
                render_duration(elapsed)
            ),
            Ok(LapOutcome::NotRunning) => not_running(&event.author_id),
            Err(error) => self.store_failure(event, "stop", &error),
        }
    }

    /// Generic per-user failure text; the log line carries the detail.
    fn store_failure(&self, event: &InboundEvent, op: &str, error: &BackendError) -> String {
        warn!(
            event_id = %event.event_id,
            author_id = %event.author_id,
            op,
            %error,
            "stopwatch operation failed"
        );
        format!("{}: stopwatch failed", event.author_id)
    }
}

fn not_running(author: &str) -> String {
    format!("{author}: stopwatch is not running, start with `.swstart`")
}

/// Render a duration the way chat users read one: `1h2m3s`, `4m5s`, `6s`.
fn render_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}
