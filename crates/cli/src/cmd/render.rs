//! One-shot rendering of a snapshot

use crate::system_config;
use crate::util;
use anyhow::Result;
use cli_lib::draw::{self, RowStyle};
use stack_core::CommitPager;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Options for `stackview render`
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub input: Option<PathBuf>,
    /// Branches whose commit list is expanded by one extra page each time listed
    pub expand: Vec<String>,
    pub no_commits: bool,
    pub no_color: bool,
}

pub async fn run(options: RenderOptions) -> Result<()> {
    let config = system_config::load()?;

    // 1. Load and lay out the snapshot
    let snapshot = util::read_snapshot(options.input.as_deref())?;
    let models = snapshot.view_models();
    debug!(rows = models.len(), "laid out snapshot");

    // 2. Reveal requested commit pages
    let mut pager = CommitPager::from_config(&config.view_config());
    for branch in &options.expand {
        pager.show_more(branch);
    }

    // 3. Draw
    let style = RowStyle {
        pager: &pager,
        palette: util::palette(options.no_color),
        show_commits: config.view.show_commits && !options.no_commits,
    };
    let text = draw::render_stack(&models, style);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
