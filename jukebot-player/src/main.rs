//! Jukebot Player (jukebot-player) - Main entry point
//!
//! Console front end for one shared playback stream. Each stdin line is a
//! chat message in the form `<user_id> <username> <text>`; replies go to
//! stdout. Playback is logged rather than streamed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebot_common::events::{EventBus, JukebotEvent};
use jukebot_common::RequesterId;
use jukebot_player::config::PlayerConfig;
use jukebot_player::playback::{Coordinator, LoggingBackend, TokioTimer};
use jukebot_player::session::{ChatMessage, ChatSession, StaticCatalog};

/// Command-line arguments for jukebot-player
#[derive(Parser, Debug)]
#[command(name = "jukebot-player")]
#[command(about = "Shared playback queue driven by chat requests")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "JUKEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PlayerConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    config
        .override_log_level(args.log_level.as_deref())
        .context("Invalid --log-level")?;

    let level = &config.logging.level;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("jukebot_player={level},jukebot_common={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting jukebot player with {} catalog tracks",
        config.catalog.tracks.len()
    );

    let events = EventBus::new(100);
    spawn_event_logger(&events);

    let coordinator = Coordinator::new(
        Arc::new(LoggingBackend::new()),
        Arc::new(TokioTimer::new()),
        events,
    );
    let catalog = Arc::new(StaticCatalog::new(config.catalog.tracks.clone()));
    let session = ChatSession::new(Arc::clone(&coordinator), catalog)
        .with_max_songs_per_user(config.queue.max_songs_per_user);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Ready for messages");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("Input closed");
                    break;
                };
                match parse_line(&line) {
                    Some(message) => println!("{}", session.handle(&message).await),
                    None if line.trim().is_empty() => {}
                    None => warn!("Ignoring malformed line: {:?}", line),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    coordinator
        .stop()
        .await
        .context("Failed to stop playback")?;
    info!("Shutdown complete");
    Ok(())
}

/// Parse `<user_id> <username> <text>`
fn parse_line(line: &str) -> Option<ChatMessage> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let id = parts.next()?.parse::<i64>().ok()?;
    let username = parts.next()?;
    let text = parts.next().unwrap_or_default();
    Some(ChatMessage::new(RequesterId(id), username, text))
}

/// Log every coordinator event as JSON at debug level
fn spawn_event_logger(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let JukebotEvent::BackendFailed { ref error, .. } = event {
                        warn!("Playback backend failure: {}", error);
                    }
                    match serde_json::to_string(&event) {
                        Ok(json) => debug!("Event: {}", json),
                        Err(e) => warn!("Failed to serialize event: {}", e),
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event logger lagged, skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
