mod bootstrap;
mod health;
mod routes;
mod sweeper;
#[cfg(test)]
mod testutil;

use std::time::Duration;

use anyhow::Result;
use carta_core::config::{AppConfig, LoadOptions};
use tracing::info;

fn init_logging(config: &AppConfig) {
    use carta_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(bind_address = %address, "chat service listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper_handle = sweeper::spawn(
        app.assistant.clone(),
        Duration::from_secs(app.config.session.sweep_interval_secs),
        shutdown_rx,
    );

    let router = routes::router(routes::AppState { assistant: app.assistant.clone() });
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    info!("chat service stopping");
    let _ = shutdown_tx.send(true);
    sweeper_handle.await?;

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
