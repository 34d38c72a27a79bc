//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache items.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::logging::EventLog;

// == Sweep Handle ==
/// Owns a scheduled sweep. Stopping or dropping the handle cancels it.
#[derive(Debug)]
pub struct SweepHandle {
    task: JoinHandle<()>,
    interval_secs: u64,
}

impl SweepHandle {
    /// Returns true while the sweep is still scheduled.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Cancels the sweep, returning whether it was still running.
    ///
    /// The task only ever parks between ticks, so no further tick runs once
    /// this returns.
    pub fn stop(self) -> bool {
        self.is_running()
        // Drop aborts
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task that runs `delete_expired` on `store` every
/// `interval_secs` seconds, first tick one interval from now.
///
/// The sweep takes the store's write lock, the same lock foreground
/// operations use. Must be called from within a Tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new()));
/// let handle = spawn_sweep_task(store.clone(), Arc::new(SystemClock), EventLog::default(), 600);
/// // Later:
/// handle.stop();
/// ```
pub(crate) fn spawn_sweep_task<V>(
    store: Arc<RwLock<CacheStore<V>>>,
    clock: Arc<dyn Clock>,
    events: EventLog,
    interval_secs: u64,
) -> SweepHandle
where
    V: Send + Sync + 'static,
{
    let period = Duration::from_secs(interval_secs);

    let task = tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval_secs
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let (removed, remaining) = {
                let mut guard = store.write();
                let removed = guard.delete_expired(clock.now());
                (removed, guard.len())
            };

            events.emit("delete-expired", || format!("removed {} items", removed));
            if removed > 0 {
                info!(removed, remaining, "Expiry sweep removed stale items");
            } else {
                debug!(remaining, "Expiry sweep found no stale items");
            }
        }
    });

    SweepHandle {
        task,
        interval_secs,
    }
}
