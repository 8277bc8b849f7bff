//! tickline: chat-triggered command responder.
//!
//! The chat transport is pluggable and out of the core's hands; this
//! binary stands one in with a line-oriented session on stdin. Each line
//! is `<author-id> <token>` and becomes one inbound event with a fresh
//! event id. All coordination state goes through the configured backend,
//! so several instances pointed at the same Redis deduplicate between
//! themselves.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tickline::backend::memory::MemoryBackend;
use tickline::backend::redis::RedisBackend;
use tickline::backend::CoordinationBackend;
use tickline::config::AppConfig;
use tickline::config::BackendKind;
use tickline::dispatcher::CommandToken;
use tickline::dispatcher::Dispatcher;
use tickline::dispatcher::InboundEvent;

#[derive(Debug, Parser)]
#[command(name = "tickline", version, about = "chat-triggered command responder")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured backend (memory or redis).
    #[arg(long)]
    backend: Option<BackendKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let backend: Arc<dyn CoordinationBackend> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
        BackendKind::Redis => {
            info!(
                address = %config.redis.address,
                port = config.redis.port,
                "connecting to redis"
            );
            Arc::new(
                RedisBackend::connect(&config.redis.url())
                    .await
                    .context("connecting to redis")?,
            )
        }
    };

    let dispatcher = Dispatcher::new(backend, config.lock.ttl(), config.identity.clone());
    info!(
        identity = %config.identity,
        backend = ?config.backend,
        "tickline online, ctrl-c to exit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) => handle_line(&dispatcher, &line).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// One stdin line is one event: `<author-id> <token>`.
async fn handle_line(dispatcher: &Dispatcher, line: &str) {
    let mut parts = line.split_whitespace();
    let (Some(author), Some(token)) = (parts.next(), parts.next()) else {
        return;
    };
    let Some(command) = CommandToken::from_token(token) else {
        return;
    };

    let event = InboundEvent {
        event_id: Uuid::new_v4().to_string(),
        author_id: author.to_string(),
        command,
        from_bot: false,
    };
    if let Some(response) = dispatcher.dispatch(&event).await {
        println!("{response}");
    }
}
