//! Process entry point.
//!
//! Loads configuration, opens the store, prepares the schema, and runs the
//! daily reset scheduler until a shutdown signal arrives. The platform
//! connection is driven by the embedding gateway; this binary owns the
//! shared state and the background work.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corvus_bot::config::Config;
use corvus_bot::scheduler::ResetScheduler;
use corvus_bot::state::AppState;

const CONVERSATION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);
const CONVERSATION_MAX_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,corvus=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting corvus");

    let config = Config::from_env()?;
    tracing::info!(
        database_path = %config.database_path.display(),
        timezone = %config.timezone,
        admin_count = config.admin_user_ids.len(),
        server_count = config.authorized_server_ids.len(),
        "configuration loaded"
    );

    let pool = corvus_store::connect(&config.database_path).await?;
    let state = AppState::new(pool, config);

    state.access.create_table().await?;
    state.usage.create_tables().await?;
    tracing::info!("store schema ready");

    let scheduler = ResetScheduler::new(state.usage.clone(), state.config.timezone).spawn();

    let sweeper = {
        let conversations = state.conversations.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CONVERSATION_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let evicted = conversations.evict_idle(CONVERSATION_MAX_IDLE);
                if evicted > 0 {
                    tracing::info!(evicted, "evicted idle conversations");
                }
            }
        })
    };

    shutdown_signal().await;
    tracing::info!("shutdown signal received");

    scheduler.abort();
    sweeper.abort();
    tracing::info!("background tasks stopped, exiting");
    Ok(())
}

/// Resolve when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install sigterm handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
