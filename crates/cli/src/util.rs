//! Shared utilities for CLI commands

use crate::draw::Palette;
use anyhow::{Context, Result};
use stack_core::Snapshot;
use std::io::IsTerminal;
use std::path::Path;

/// Read a snapshot from a file, or from stdin when no path (or `-`) is given
pub fn read_snapshot(input: Option<&Path>) -> Result<Snapshot> {
    match input {
        Some(path) if path != Path::new("-") => read_snapshot_file(path),
        _ => Snapshot::from_reader(std::io::stdin().lock())
            .context("Failed to read snapshot from stdin"),
    }
}

/// Read a snapshot file
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open snapshot {}", path.display()))?;
    Snapshot::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to read snapshot {}", path.display()))
}

/// Styled output only on a terminal, and never when `NO_COLOR` is set
pub fn palette(no_color: bool) -> Palette {
    let enabled =
        !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    Palette::new(enabled)
}
