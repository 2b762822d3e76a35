//! The adaptive polling loop.
//!
//! Spawned whenever the store holds at least one non-terminal job and
//! cancelled as soon as none remain. Starting and stopping both go
//! through `JobTracker::sync_poller`, which owns the single handle, so
//! at most one timer is ever alive.

use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::tracker::JobTracker;

/// Run reconciliation ticks until cancelled.
///
/// The first tick fires one full interval after start. Each tick
/// re-reads the active set from the live store rather than any snapshot
/// captured at spawn time, and never lets a fetch failure escape.
pub(crate) async fn run(tracker: Arc<JobTracker>, cancel: CancellationToken) {
    let period = tracker.poll_interval();
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(
        poll_interval_ms = period.as_millis() as u64,
        "Poller started",
    );

    loop {
        tokio::select! {
            // Checked first so that a cancellation racing a due tick
            // always wins and no extra tick runs.
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Poller stopped");
                break;
            }
            _ = ticker.tick() => {
                tracker.poll_active_jobs().await;
            }
        }
    }
}
