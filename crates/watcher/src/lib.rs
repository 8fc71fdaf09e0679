//! Snapshot file watching for stackview
//!
//! This crate provides:
//! - Change notifications for a snapshot file (notify based)
//! - Periodic mtime polling as a fallback for missed events
//! - Debouncing of event bursts
//! - Refresh coalescing (one run in flight, one trailing run)

pub mod coalesce;
pub mod debounce;
pub mod poll;

pub use coalesce::{CoalesceStats, Coalescer};
pub use debounce::Debouncer;
pub use poll::PeriodicPoller;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Errors raised while watching
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("cannot stat {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a file path: {0}")]
    InvalidPath(PathBuf),
}

/// File system event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Type of change
    pub kind: EventKind,
}

/// Type of file system event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// File created
    Create,
    /// File modified
    Modify,
    /// File deleted
    Delete,
    /// File renamed (editors saving via rename land here)
    Rename,
}

impl EventKind {
    fn from_notify(kind: &notify::EventKind) -> Option<Self> {
        use notify::event::ModifyKind;

        match kind {
            notify::EventKind::Create(_) => Some(EventKind::Create),
            notify::EventKind::Modify(ModifyKind::Name(_)) => Some(EventKind::Rename),
            notify::EventKind::Modify(_) => Some(EventKind::Modify),
            notify::EventKind::Remove(_) => Some(EventKind::Delete),
            notify::EventKind::Access(_) | notify::EventKind::Any | notify::EventKind::Other => None,
        }
    }
}

/// Watches a single snapshot file
///
/// The parent directory is watched rather than the file itself so that
/// atomic replace-by-rename saves keep being seen.
pub struct SnapshotWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl SnapshotWatcher {
    /// Start watching `path`, forwarding its events to `events`
    pub fn watch(path: &Path, events: mpsc::Sender<WatchEvent>) -> Result<Self, WatchError> {
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| WatchError::InvalidPath(path.to_path_buf()))?
            .to_os_string();
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    debug!("watch error: {}", e);
                    return;
                }
            };
            let Some(kind) = EventKind::from_notify(&event.kind) else {
                return;
            };

            for changed in event.paths {
                if changed.file_name() != Some(file_name.as_os_str()) {
                    continue;
                }
                // Bursts are debounced downstream, so a full channel only
                // drops duplicates
                if events.try_send(WatchEvent { path: changed, kind }).is_err() {
                    trace!("event channel full, dropping event");
                }
            }
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        debug!("watching {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            _watcher: watcher,
        })
    }

    /// Path being watched
    pub fn path(&self) -> &Path {
        &self.path
    }
}
