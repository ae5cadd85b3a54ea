use super::handle::DashboardHandle;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Start the periodic refresh loop for one dashboard.
///
/// Each tick refetches the active range and logs queued notices. The loop
/// ends once the dashboard actor is gone.
pub fn start_refresh_scheduler(handle: DashboardHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let kind = handle.kind().as_str();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and the mount fetch already ran
        ticker.tick().await;

        info!(dashboard = kind, "Refresh scheduled every {}s", period.as_secs());
        loop {
            ticker.tick().await;

            match handle.refresh().await {
                Ok(true) => debug!(dashboard = kind, "Calendar refresh started"),
                Ok(false) => debug!(dashboard = kind, "Calendar refresh skipped, fetch in flight"),
                Err(e) => {
                    error!(dashboard = kind, "Stopping refresh scheduler: {}", e);
                    break;
                }
            }

            match handle.take_notices().await {
                Ok(notices) => {
                    for notice in notices {
                        if notice.is_failure() {
                            warn!(dashboard = kind, "{}", notice);
                        } else {
                            info!(dashboard = kind, "{}", notice);
                        }
                    }
                }
                Err(e) => {
                    error!(dashboard = kind, "Failed to read notices: {}", e);
                    break;
                }
            }
        }
    })
}
