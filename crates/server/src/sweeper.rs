use std::sync::Arc;
use std::time::Duration;

use carta_agent::ShoppingAssistant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Periodic expired-session sweep with a lifetime scoped to the process:
/// the returned handle is joined at shutdown after flipping the watch
/// channel, so the task is never left dangling.
pub fn spawn(
    assistant: Arc<ShoppingAssistant>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the first
        // sweep happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = assistant.sessions().cleanup_expired();
                    if removed > 0 {
                        info!(removed, "periodic session sweep");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("session sweeper stopped");
    })
}
