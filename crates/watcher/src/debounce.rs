//! Debouncing of watch events
//!
//! Editors and generators tend to touch a file several times in quick
//! succession. The debouncer waits for a quiet window before forwarding one
//! batch of distinct paths.

use crate::WatchEvent;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::trace;

/// Default quiet window
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

/// Trailing-edge debouncer
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Forward batches of changed paths until either channel closes
    ///
    /// Each batch is emitted once no event arrived for a full window.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<WatchEvent>,
        batches: mpsc::Sender<Vec<PathBuf>>,
    ) {
        while let Some(first) = events.recv().await {
            let mut pending = BTreeSet::new();
            pending.insert(first.path);
            let mut closed = false;

            loop {
                match timeout(self.window, events.recv()).await {
                    Ok(Some(event)) => {
                        pending.insert(event.path);
                    }
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    // Quiet window elapsed
                    Err(_) => break,
                }
            }

            trace!(paths = pending.len(), "debounced batch");
            if batches.send(pending.into_iter().collect()).await.is_err() || closed {
                return;
            }
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
