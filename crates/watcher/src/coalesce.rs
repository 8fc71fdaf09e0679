//! Refresh coalescing
//!
//! At most one refresh runs at a time. Requests arriving while one is in
//! flight collapse into a single trailing refresh, so a burst of changes
//! costs at most two fetches.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Counters exposed for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalesceStats {
    /// Calls to [`Coalescer::request`]
    pub requested: u64,
    /// Refreshes started
    pub started: u64,
    /// Refreshes that ran to completion
    pub completed: u64,
}

/// Serializes refreshes on a background task
pub struct Coalescer {
    notify: Arc<Notify>,
    stats: Arc<Mutex<CoalesceStats>>,
    task: JoinHandle<()>,
}

impl Coalescer {
    /// Spawn the refresh loop on the current tokio runtime
    pub fn spawn<F, Fut>(mut refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let notify = Arc::new(Notify::new());
        let stats = Arc::new(Mutex::new(CoalesceStats::default()));

        let task = {
            let notify = Arc::clone(&notify);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                loop {
                    // Stores at most one permit, which is what merges
                    // requests made during a run
                    notify.notified().await;

                    stats.lock().started += 1;
                    refresh().await;
                    stats.lock().completed += 1;
                }
            })
        };

        Self {
            notify,
            stats,
            task,
        }
    }

    /// Ask for a refresh
    pub fn request(&self) {
        let requested = {
            let mut stats = self.stats.lock();
            stats.requested += 1;
            stats.requested
        };
        trace!(requested, "refresh requested");
        self.notify.notify_one();
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CoalesceStats {
        *self.stats.lock()
    }
}

impl Drop for Coalescer {
    fn drop(&mut self) {
        debug!("stopping refresh loop");
        self.task.abort();
    }
}
