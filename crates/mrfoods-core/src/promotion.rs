//! Recurring promotion of pending orders

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{CoreEvent, Storefront};

/// Storefront shared between a front end and the promotion task
pub type SharedStorefront = Arc<Mutex<Storefront>>;

/// Shortest sweep period; shorter intervals, zero included, are raised to it
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to the background sweep. Call [`PromotionTask::stop`] to end it
/// cleanly; dropping the handle aborts the task.
pub struct PromotionTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PromotionTask {
    /// Spawn a task that sweeps the ledger every `interval`, starting
    /// immediately. Completion events are forwarded to `events`.
    /// `interval` is clamped to at least [`MIN_SWEEP_INTERVAL`].
    pub fn spawn(
        storefront: SharedStorefront,
        interval: Duration,
        events: mpsc::UnboundedSender<CoreEvent>,
    ) -> Self {
        if interval < MIN_SWEEP_INTERVAL {
            warn!(
                requested = ?interval,
                min = ?MIN_SWEEP_INTERVAL,
                "Sweep interval too short, raising it"
            );
        }
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Promotion task received stop");
                        break;
                    }

                    _ = ticker.tick() => {
                        let now = mrfoods_util::now();
                        let result = {
                            let mut storefront = storefront.lock().await;
                            storefront.sweep(&now)
                        };

                        match result {
                            Ok(completed) => {
                                for event in completed {
                                    // Nobody listening is fine
                                    let _ = events.send(event);
                                }
                            }
                            Err(e) => warn!(error = %e, "Promotion sweep failed"),
                        }
                    }
                }
            }
        });

        info!(interval_secs = interval.as_secs_f64(), "Promotion task started");

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task and wait for it to finish its current sweep
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Promotion task ended abnormally");
        }
        info!("Promotion task stopped");
    }
}

impl Drop for PromotionTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
