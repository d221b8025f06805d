//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Guestlist application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "guestlist.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
        .try_init()
        .map_err(|e| crate::utils::errors::GuestListError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an event lifecycle transition
pub fn log_event_transition(event_id: Uuid, from: &str, to: &str, actor: &str) {
    info!(
        event_id = %event_id,
        from = from,
        to = to,
        actor = actor,
        "Event lifecycle transition"
    );
}

/// Log a check-in redemption
pub fn log_check_in(guest_id: Uuid, station: &str, already_checked_in: bool) {
    if already_checked_in {
        debug!(
            guest_id = %guest_id,
            station = station,
            "Repeat scan of an already checked-in guest"
        );
    } else {
        info!(
            guest_id = %guest_id,
            station = station,
            "Guest checked in"
        );
    }
}

/// Log the outcome of one provider send
pub fn log_provider_send(channel: &str, guest_id: Uuid, success: bool, error_message: Option<&str>) {
    if success {
        debug!(channel = channel, guest_id = %guest_id, "Invitation delivered to provider");
    } else {
        warn!(
            channel = channel,
            guest_id = %guest_id,
            error = error_message,
            "Invitation send failed"
        );
    }
}

/// Log a sweep pass summary
pub fn log_sweep_report(completed: u32, archived: u32, purged: u32, failed: u32) {
    if failed > 0 {
        warn!(
            completed = completed,
            archived = archived,
            purged = purged,
            failed = failed,
            "Lifecycle sweep finished with failures"
        );
    } else {
        info!(
            completed = completed,
            archived = archived,
            purged = purged,
            "Lifecycle sweep finished"
        );
    }
}

/// Log storage errors with context
pub fn log_store_error(operation: &str, error: &str, context: Option<&str>) {
    error!(
        operation = operation,
        error = error,
        context = context,
        "Store operation failed"
    );
}
