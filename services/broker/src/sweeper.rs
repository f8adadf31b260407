use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::types::SWEEP_INTERVAL_SECS;
use crate::state::AppState;

/// Background token-refresh sweep. Every interval tick runs the same
/// refresh-if-needed decision the request-path gate uses; the shared
/// `RefreshGate` keeps the two triggers from refreshing concurrently.
/// Stops cleanly when the shutdown token fires.
pub async fn run(state: AppState, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs = SWEEP_INTERVAL_SECS, "token refresh sweeper started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                match state.refresh_if_needed().execute().await {
                    Ok(true) => debug!("token fresh or refreshed"),
                    Ok(false) => {
                        warn!("token could not be refreshed; re-authentication required")
                    }
                    Err(e) => error!(error = %e, "refresh sweep failed"),
                }
            }
        }
    }
    info!("token refresh sweeper stopped");
}
