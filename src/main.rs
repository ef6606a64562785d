//! Typing Duel terminal client
//!
//! Joins a game on the authority and plays it from the terminal:
//! - WebSocket connection to `/ws/game/{code}/{pid}`
//! - stdin lines as keystrokes (`/start` to start as host, `<` for Backspace)
//! - scene, HUD and audio reported through the log

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use typing_duel_client::app::keyboard::pump_lines;
use typing_duel_client::app::runner::INPUT_CHANNEL_CAPACITY;
use typing_duel_client::app::Runner;
use typing_duel_client::config::Config;
use typing_duel_client::game::{GameSession, Phase};
use typing_duel_client::render::Collaborators;
use typing_duel_client::util::time::Timer;
use typing_duel_client::ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Typing Duel client");
    info!(
        game_code = %config.game_code,
        player_id = %config.player_id,
        host = config.is_host,
        "Joining game"
    );

    // Session clock shared with the transport's timestamps
    let timer = Timer::new();
    let url = config.ws_url();
    let connection = ws::connect(&url, timer).await?;

    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let keyboard = tokio::spawn(pump_lines(tokio::io::stdin(), input_tx));

    let session = GameSession::new(&config, Collaborators::logging(), connection.outbound_tx);
    let runner = Runner::new(
        session,
        connection.network_rx,
        input_rx,
        config.frame_rate,
        timer,
    );

    tokio::select! {
        summary = runner.run() => {
            match summary.phase {
                Phase::Disconnected => {
                    warn!(diagnostics = ?summary.diagnostics, "Disconnected from authority")
                }
                phase => info!(?phase, diagnostics = ?summary.diagnostics, "Game finished"),
            }
        }
        _ = shutdown_signal() => {}
    }

    keyboard.abort();
    connection.tasks.shutdown();

    info!("Client shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, leaving game"),
        Err(e) => {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
