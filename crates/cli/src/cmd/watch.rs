//! Live view of a snapshot file
//!
//! File events (and a slow mtime poll as fallback) are debounced, then
//! collapsed by the coalescer into at most one reload in flight. Each
//! reloaded snapshot is reconciled into the terminal surface, which is
//! repainted while transitions run.

use crate::system_config;
use crate::util;
use anyhow::{Context, Result};
use cli_lib::surface::TerminalSurface;
use stack_core::Snapshot;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use watcher::{Coalescer, Debouncer, PeriodicPoller, SnapshotWatcher};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Options for `stackview watch`
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub input: PathBuf,
    pub no_color: bool,
}

pub async fn run(options: WatchOptions) -> Result<()> {
    let config = system_config::load()?;
    let input = options.input.clone();

    // 1. Reloads run through the coalescer and hand snapshots to the UI loop
    let (snapshot_tx, mut snapshot_rx) = mpsc::channel::<Snapshot>(4);
    let coalescer = {
        let input = input.clone();
        Coalescer::spawn(move || {
            let input = input.clone();
            let snapshot_tx = snapshot_tx.clone();
            async move {
                let loaded =
                    tokio::task::spawn_blocking(move || util::read_snapshot_file(&input)).await;
                match loaded {
                    Ok(Ok(snapshot)) => {
                        let _ = snapshot_tx.send(snapshot).await;
                    }
                    Ok(Err(e)) => warn!("Reload failed: {:#}", e),
                    Err(e) => warn!("Reload task failed: {}", e),
                }
            }
        })
    };
    coalescer.request();

    // 2. File events -> debouncer -> reload requests
    let (event_tx, event_rx) = mpsc::channel(64);
    let _watcher = SnapshotWatcher::watch(&input, event_tx.clone())
        .with_context(|| format!("Failed to watch {}", input.display()))?;

    if config.watch.poll_interval_secs > 0 {
        let poll_interval = Duration::from_secs(config.watch.poll_interval_secs);
        tokio::spawn(PeriodicPoller::new(input.clone(), poll_interval, event_tx).run());
    } else {
        drop(event_tx);
    }

    let (batch_tx, mut batch_rx) = mpsc::channel(8);
    tokio::spawn(
        Debouncer::new(Duration::from_millis(config.watch.debounce_ms)).run(event_rx, batch_tx),
    );

    // 3. UI loop
    let mut surface = TerminalSurface::new(&config, util::palette(options.no_color));
    let mut frames = interval(Duration::from_millis(config.animation.frame_ms));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();
    let mut dirty = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Watching {}", input.display());

    loop {
        tokio::select! {
            Some(batch) = batch_rx.recv() => {
                debug!(paths = batch.len(), "snapshot changed");
                coalescer.request();
            }
            Some(snapshot) = snapshot_rx.recv() => {
                let stats = surface.update(&snapshot);
                info!(
                    inserted = stats.inserted,
                    updated = stats.updated,
                    moved = stats.moved,
                    removed = stats.removed,
                    "reconciled snapshot"
                );
                dirty = true;
            }
            _ = frames.tick() => {
                let now = Instant::now();
                if surface.tick(now - last_tick) > 0 {
                    dirty = true;
                }
                last_tick = now;
            }
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
        }

        if dirty {
            paint(&surface)?;
            dirty = surface.frame() > 0;
        }
    }

    Ok(())
}

fn paint(surface: &TerminalSurface) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(CLEAR_SCREEN.as_bytes())?;
    stdout.write_all(surface.paint().as_bytes())?;
    stdout.flush()?;
    Ok(())
}
