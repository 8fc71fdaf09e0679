//! Text rendering of stack rows
//!
//! Each lane takes a glyph column, with a spacer column between lanes. A
//! row's node sits on its own lane and connects to the lanes of its children
//! with a horizontal run ending in `┘`. Restack-pending edges are drawn in yellow.

use owo_colors::OwoColorize;
use stack_core::{BranchViewModel, CommitPager, LaneSegment, NodeStyle, TreeFragmentData};

/// Whether ANSI styling is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

/// Styles used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Restack,
    Current,
    Muted,
    Accent,
    Entering,
    Leaving,
    Flashing,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match tone {
            Tone::Restack => text.yellow().to_string(),
            Tone::Current => text.green().bold().to_string(),
            Tone::Muted => text.dimmed().to_string(),
            Tone::Accent => text.cyan().to_string(),
            Tone::Entering => text.green().to_string(),
            Tone::Leaving => text.red().to_string(),
            Tone::Flashing => text.yellow().bold().to_string(),
        }
    }

    fn edge(&self, glyph: char, restack: bool) -> String {
        if restack {
            self.paint(&glyph.to_string(), Tone::Restack)
        } else {
            glyph.to_string()
        }
    }
}

fn node_glyph(style: NodeStyle) -> char {
    match style {
        NodeStyle::Normal => '◯',
        NodeStyle::Current => '◉',
        NodeStyle::Uncommitted => '◌',
    }
}

fn vertical(segment: &LaneSegment) -> bool {
    segment.continues_from_above || segment.continues_below
}

/// Graph columns for the row's own line
pub fn graph_line(fragment: &TreeFragmentData, palette: Palette) -> String {
    let node = fragment.node_lane;
    let fork_end = fragment
        .child_fork_lanes
        .iter()
        .map(|fork| fork.lane)
        .filter(|&lane| lane > node)
        .max();
    let fork_restack = |lane: usize| {
        fragment
            .child_fork_lanes
            .iter()
            .any(|fork| fork.lane == lane && fork.needs_restack)
    };
    // The horizontal run is restack-colored up to the last restack fork
    let restack_end = fragment
        .child_fork_lanes
        .iter()
        .filter(|fork| fork.needs_restack)
        .map(|fork| fork.lane)
        .max();

    let mut out = String::new();
    for (lane, segment) in fragment.lanes.iter().enumerate() {
        let in_run = fork_end.is_some_and(|end| lane > node && lane <= end);
        let run_restack = restack_end.is_some_and(|end| lane <= end);

        let cell = if lane == node {
            let glyph = node_glyph(fragment.node_style).to_string();
            match fragment.node_style {
                NodeStyle::Current => palette.paint(&glyph, Tone::Current),
                NodeStyle::Uncommitted => palette.paint(&glyph, Tone::Muted),
                NodeStyle::Normal if fragment.node_needs_restack => {
                    palette.paint(&glyph, Tone::Restack)
                }
                NodeStyle::Normal => glyph,
            }
        } else if in_run {
            let is_fork = fragment.child_fork_lanes.iter().any(|fork| fork.lane == lane);
            let glyph = match (is_fork, Some(lane) == fork_end, segment.continues_below) {
                (true, true, false) => '┘',
                (true, true, true) => '┤',
                (true, false, _) => '┴',
                (false, _, _) if vertical(segment) => '┼',
                (false, _, _) => '─',
            };
            palette.edge(glyph, if is_fork { fork_restack(lane) } else { run_restack })
        } else if vertical(segment) {
            palette.edge('│', segment.needs_restack)
        } else {
            " ".to_string()
        };
        out.push_str(&cell);
        if lane == fragment.max_lane {
            break;
        }

        let spacer_in_run = fork_end.is_some_and(|end| lane >= node && lane < end);
        if spacer_in_run {
            let restack = restack_end.is_some_and(|end| lane < end);
            out.push_str(&palette.edge('─', restack));
        } else {
            out.push(' ');
        }
    }
    out
}

/// Graph columns for detail lines under a row (commits, files)
pub fn continuation_line(fragment: &TreeFragmentData, palette: Palette) -> String {
    let mut out = String::new();
    for (lane, segment) in fragment.lanes.iter().enumerate() {
        if lane > 0 {
            out.push(' ');
        }
        if segment.continues_below {
            out.push_str(&palette.edge('│', segment.needs_restack));
        } else {
            out.push(' ');
        }
    }
    out
}

/// Rendering options for a row
#[derive(Debug, Clone, Copy)]
pub struct RowStyle<'a> {
    pub pager: &'a CommitPager,
    pub palette: Palette,
    pub show_commits: bool,
}

fn label(model: &BranchViewModel, palette: Palette) -> String {
    if let Some(files) = &model.uncommitted_files {
        let noun = if files.len() == 1 { "file" } else { "files" };
        return palette.paint(
            &format!("Uncommitted changes ({} {})", files.len(), noun),
            Tone::Muted,
        );
    }

    let mut text = if model.current {
        palette.paint(&model.name, Tone::Current)
    } else {
        model.name.clone()
    };

    if model.needs_restack {
        text.push(' ');
        text.push_str(&palette.paint("(needs restack)", Tone::Restack));
    }

    if let Some(change) = &model.change {
        text.push(' ');
        text.push_str(&palette.paint(&change.id, Tone::Accent));
        if let Some(status) = &change.status {
            text.push_str(&palette.paint(&format!(" [{}]", status), Tone::Muted));
        }
        if let Some(title) = &change.title {
            text.push(' ');
            text.push_str(title);
        }
    }

    text
}

/// All lines for one row, graph included
pub fn row_lines(model: &BranchViewModel, style: RowStyle<'_>) -> Vec<String> {
    let palette = style.palette;
    let mut lines = vec![format!(
        "{} {}",
        graph_line(&model.fragment, palette),
        label(model, palette)
    )];
    let prefix = continuation_line(&model.fragment, palette);

    if let Some(files) = &model.uncommitted_files {
        for file in files {
            lines.push(format!(
                "{}   {:>2} {}",
                prefix,
                palette.paint(&file.status, Tone::Accent),
                file.path
            ));
        }
    }

    if style.show_commits {
        if let Some(commits) = &model.commits {
            let page = style.pager.visible(&model.name, commits);
            for commit in page.visible {
                lines.push(format!(
                    "{}   {} {}",
                    prefix,
                    palette.paint(commit.short_sha(), Tone::Muted),
                    commit.message
                ));
            }
            if page.hidden > 0 {
                let noun = if page.hidden == 1 { "commit" } else { "commits" };
                lines.push(format!(
                    "{}   {}",
                    prefix,
                    palette.paint(&format!("… {} more {}", page.hidden, noun), Tone::Muted)
                ));
            }
        }
    }

    lines
}

/// Render a whole stack, one row after another
pub fn render_stack(models: &[BranchViewModel], style: RowStyle<'_>) -> String {
    let mut out = String::new();
    for model in models {
        for line in row_lines(model, style) {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}
