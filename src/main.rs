//! Headless display follower: subscribes to a game's realtime channel, keeps
//! a local copy of the authoritative state, and logs the scoreboard on every
//! update. When the channel degrades it falls back to polling the backend.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dartlink::backend::{BackendConfig, GameBackend, HttpGameBackend};
use dartlink::config::AppConfig;
use dartlink::dto::format_epoch_ms;
use dartlink::engine::{Game, GamePhase, compute_stats};
use dartlink::services::GameCoordinator;
use dartlink::sync::{ChannelRegistry, ConnectionState, SnapshotSyncTransport, WsConnector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let game_id =
        env::var("DARTLINK_GAME_ID").context("DARTLINK_GAME_ID must name the game to follow")?;

    let mut backend_config = BackendConfig::new(config.backend_url.clone());
    if let Ok(token) = env::var("DARTLINK_SESSION_TOKEN") {
        backend_config = backend_config.with_session_token(token);
    }
    let backend =
        Arc::new(HttpGameBackend::new(backend_config).context("building backend client")?);

    let snapshot = backend
        .fetch_snapshot(&game_id)
        .await
        .context("fetching initial snapshot")?;
    match snapshot.game.started_at {
        Some(started) => info!(
            game_id = %game_id,
            started_at = %format_epoch_ms(started),
            "following game"
        ),
        None => info!(game_id = %game_id, "following game"),
    }

    let mut coordinator = GameCoordinator::attach(backend.clone(), &game_id)
        .await
        .context("attaching to game")?;
    log_scoreboard(coordinator.game());

    let connector = Arc::new(WsConnector::new(config.realtime_url.clone()));
    let (transport, mut snapshots) = SnapshotSyncTransport::new(
        game_id.clone(),
        connector,
        ChannelRegistry::new(),
        config.tuning.clone(),
    );
    transport.connect().context("subscribing to realtime channel")?;

    let mut channel_state = transport.watch_state();
    let mut poll = tokio::time::interval(config.fallback_poll);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
            maybe_snapshot = snapshots.next() => {
                let Some(snapshot) = maybe_snapshot else { break };
                match coordinator.apply_snapshot(&snapshot) {
                    Ok(()) => log_scoreboard(coordinator.game()),
                    Err(error) => warn!(%error, "ignoring unusable snapshot"),
                }
            }
            changed = channel_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *channel_state.borrow_and_update();
                info!(%state, "realtime channel state changed");
            }
            _ = poll.tick(), if transport.state() == ConnectionState::Fallback => {
                match coordinator.refresh().await {
                    Ok(game) => log_scoreboard(game),
                    Err(error) => {
                        warn!(error = %error.user_message(), "fallback poll failed");
                    }
                }
            }
        }
    }

    transport.disconnect().await;
    Ok(())
}

/// Log every player's line plus the derived metrics.
fn log_scoreboard(game: &Game) {
    for (index, player) in game.players.iter().enumerate() {
        let throwing = game.phase == GamePhase::InProgress && index == game.current_player_index;
        info!(
            player = %player.name,
            remaining = player.remaining,
            throwing,
            "scoreboard"
        );
    }

    for stats in compute_stats(game) {
        let checkout = stats
            .checkout_percent
            .map(|percent| format!("{percent:.0}%"))
            .unwrap_or_else(|| "-".into());
        info!(
            player = %stats.player_name,
            avg = %format!("{:.1}", stats.avg_per_turn),
            maximums = stats.count_180s,
            busts = stats.busts,
            checkout = %checkout,
            "stats"
        );
    }

    if let Some(winner) = &game.winner {
        info!(winner = %winner.player_name, turns = winner.turns, "game over");
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the follower down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
