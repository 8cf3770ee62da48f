use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;
use crate::domain::services::cleanup::purge_expired;

/// Runs the retention purge every `interval` until the process exits.
/// A failed run is logged and the next one starts from scratch.
pub async fn start_cleanup_worker(state: Arc<AppState>, interval: Duration) {
    info!("Starting cleanup worker (every {}s)...", interval.as_secs());

    loop {
        let span = info_span!("cleanup_run", run_at = %Utc::now());

        async {
            match purge_expired(&state.slot_repo, Utc::now()).await {
                Ok(report) => info!(
                    bookings_deleted = report.bookings_deleted,
                    slots_deleted = report.slots_deleted,
                    "Cleanup run completed"
                ),
                Err(e) => error!("Cleanup run failed: {:?}", e),
            }
        }
            .instrument(span)
            .await;

        sleep(interval).await;
    }
}
