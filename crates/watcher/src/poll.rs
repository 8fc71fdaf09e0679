//! Periodic mtime polling
//!
//! Periodically checks the snapshot file for changes that may have been
//! missed by the file watcher (network filesystems, overflow, races).

use crate::{EventKind, WatchError, WatchEvent};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Periodic mtime poller for one file
pub struct PeriodicPoller {
    /// File being polled
    path: PathBuf,

    /// Poll interval
    interval: Duration,

    /// Modification time seen on the previous poll
    last_seen: Option<SystemTime>,

    /// Sender for detected changes
    change_tx: mpsc::Sender<WatchEvent>,
}

impl PeriodicPoller {
    /// Create a new poller
    pub fn new(path: PathBuf, interval: Duration, change_tx: mpsc::Sender<WatchEvent>) -> Self {
        Self {
            path,
            interval,
            last_seen: None,
            change_tx,
        }
    }

    /// Run the polling loop until the receiving side goes away
    pub async fn run(mut self) {
        let mut timer = interval(self.interval);

        info!(
            "Polling {} for changes (interval: {:?})",
            self.path.display(),
            self.interval
        );

        loop {
            timer.tick().await;

            match self.check() {
                Ok(true) => {
                    let event = WatchEvent {
                        path: self.path.clone(),
                        kind: EventKind::Modify,
                    };
                    if self.change_tx.send(event).await.is_err() {
                        debug!("change receiver dropped, stopping poller");
                        return;
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Polling {} failed: {}", self.path.display(), e);
                }
            }
        }
    }

    /// Whether the file changed since the previous check
    ///
    /// The first successful check only records a baseline.
    fn check(&mut self) -> Result<bool, WatchError> {
        let mtime = std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|source| WatchError::Io {
                path: self.path.clone(),
                source,
            })?;

        let changed = self.last_seen.is_some_and(|seen| seen != mtime);
        self.last_seen = Some(mtime);
        Ok(changed)
    }
}
