//! Guestlist
//!
//! Main application entry point: connects storage and runs the lifecycle
//! sweeper until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};

use guestlist::{
    config::Settings,
    database::{create_pool, health_check, run_migrations, DatabaseService, PoolConfig, Store},
    services::{run_sweeper, ServiceFactory},
    utils::{logging, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", guestlist::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&PoolConfig::from(&settings.database)).await?;
    run_migrations(&pool).await?;
    health_check(&pool).await.context("Database health check failed")?;

    let store: Arc<dyn Store> = Arc::new(DatabaseService::new(pool));
    let services = ServiceFactory::new(&settings, store, Arc::new(SystemClock))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let interval = Duration::from_secs(settings.lifecycle.sweep_interval_seconds);
    let sweeper = tokio::spawn(run_sweeper(services.lifecycle.clone(), interval, shutdown_rx));

    info!("Guestlist is ready");

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(true);

    match sweeper.await {
        Ok(totals) => info!(transitions = totals.transitions(), "Sweeper finished"),
        Err(e) => error!("Sweeper task failed: {}", e),
    }

    info!("Guestlist has been shut down.");
    Ok(())
}
