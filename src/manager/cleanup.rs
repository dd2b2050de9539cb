//! Cleanup Scheduler
//!
//! Periodic task that sweeps zero-count filters out of the registry once
//! they have outlived the grace period.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::registry::FilterRegistry;

/// Smallest sweep period the scheduler will run at
const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to the background sweep task
///
/// The task exits when `stop` is called or when this handle is dropped,
/// whichever comes first. A sweep that is already running always finishes.
pub struct CleanupScheduler {
    shutdown: broadcast::Sender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CleanupScheduler {
    /// Spawn the sweep task on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(registry: Arc<FilterRegistry>, interval: Duration, threshold: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = broadcast::channel(1);
        let period = if interval < MIN_CLEANUP_INTERVAL {
            warn!(
                "Topic cleanup interval {:?} is below {:?}, sweeping every {:?}",
                interval, MIN_CLEANUP_INTERVAL, MIN_CLEANUP_INTERVAL
            );
            MIN_CLEANUP_INTERVAL
        } else {
            interval
        };

        let task = tokio::spawn(async move {
            info!(
                "Topic cleanup started (interval={:?}, threshold={:?})",
                period, threshold
            );

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    result = shutdown_rx.recv() => {
                        match result {
                            Ok(()) => break,
                            Err(broadcast::error::RecvError::Closed) => break,
                            Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        }
                    }
                    _ = ticker.tick() => {
                        let removed = registry.sweep(Instant::now(), threshold);
                        if removed > 0 {
                            debug!(
                                "Topic cleanup removed {} filters ({} remaining)",
                                removed,
                                registry.len()
                            );
                        }
                    }
                }
            }

            info!("Topic cleanup stopped");
        });

        Self {
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Cancel future ticks
    pub fn stop(&self) {
        // No receiver means the task already exited
        let _ = self.shutdown.send(());
    }

    /// Cancel future ticks and wait for the task to exit
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Whether the sweep task is still alive
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}
