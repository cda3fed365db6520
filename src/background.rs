use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info};
use crate::state::AppState;

/// Active half of the expiry contract: periodically reclaims expired holds
/// so abandoned selections never lock inventory. Read paths additionally
/// resolve expiry lazily, so correctness does not depend on sweep timing.
pub async fn start_expiry_sweeper(state: Arc<AppState>) {
    info!("Starting hold expiry sweeper...");

    let interval = Duration::from_secs(state.config.sweep_interval_secs);

    loop {
        match state.reservation_store.release_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(released) => info!("Released {} expired holds", released),
            Err(e) => error!("Failed to sweep expired holds: {:?}", e),
        }
        sleep(interval).await;
    }
}
