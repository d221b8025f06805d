//! Background lifecycle sweeper

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;
use crate::services::lifecycle::{LifecycleController, SweepReport};

/// Run sweep passes every `interval` until `shutdown` flips to true or its
/// sender is dropped. The first pass runs immediately. Returns the totals
/// across all passes.
pub async fn run_sweeper(
    controller: LifecycleController,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> SweepReport {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut totals = SweepReport::default();

    info!(interval_seconds = interval.as_secs(), "Lifecycle sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = controller.sweep().await;
                totals.completed += report.completed;
                totals.archived += report.archived;
                totals.purged += report.purged;
                totals.failed += report.failed;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(
        completed = totals.completed,
        archived = totals.archived,
        purged = totals.purged,
        failed = totals.failed,
        "Lifecycle sweeper stopped"
    );
    totals
}
