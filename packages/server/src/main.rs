//! Job lifecycle HTTP server.

mod config;

use std::error::Error;

use actors::{WebhookNotifier, start_engine};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = Config::from_env()?;

    let repo = db::init(config.db_config()).await?;
    tracing::info!("Database ready at {}", config.database_url);

    let notifier = WebhookNotifier::new(config.webhook_url.clone());
    let (engine, _handle) = start_engine(repo, notifier, config.engine_config()).await?;

    let app = api::router(engine.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
