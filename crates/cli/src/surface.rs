//! Live terminal surface for `stackview watch`
//!
//! Owns the keyed list of rendered rows and turns each snapshot into a
//! reconciliation pass. Visual state is shown in a one-column gutter.

use crate::draw::{self, Palette, RowStyle, Tone};
use crate::system_config::SystemConfig;
use reconcile::{diff_list, DiffStats, KeyedList, RowRenderer, Slot};
use stack_core::{BranchViewModel, CommitPager, Snapshot};
use std::time::Duration;
use tracing::debug;

/// Rendered lines of one row
pub type RowLines = Vec<String>;

struct RowPainter<'a> {
    style: RowStyle<'a>,
}

impl RowRenderer<BranchViewModel> for RowPainter<'_> {
    type Element = RowLines;

    fn key(&self, item: &BranchViewModel) -> String {
        item.name.clone()
    }

    fn render(&self, item: &BranchViewModel) -> RowLines {
        draw::row_lines(item, self.style)
    }

    fn needs_update(&self, old: &BranchViewModel, new: &BranchViewModel) -> bool {
        old != new
    }
}

/// Animated view of the latest snapshot
pub struct TerminalSurface {
    list: KeyedList<BranchViewModel, RowLines>,
    pager: CommitPager,
    palette: Palette,
    show_commits: bool,
}

impl TerminalSurface {
    pub fn new(config: &SystemConfig, palette: Palette) -> Self {
        Self {
            list: KeyedList::new(config.transition_config()),
            pager: CommitPager::from_config(&config.view_config()),
            palette,
            show_commits: config.view.show_commits,
        }
    }

    /// Reconcile the rows against a new snapshot
    pub fn update(&mut self, snapshot: &Snapshot) -> DiffStats {
        let models = snapshot.view_models();
        self.pager.retain(models.iter().map(|model| model.name.as_str()));

        let painter = RowPainter {
            style: RowStyle {
                pager: &self.pager,
                palette: self.palette,
                show_commits: self.show_commits,
            },
        };
        let stats = diff_list(&mut self.list, &models, &painter);
        debug!(?stats, rows = self.list.len(), "surface updated");
        stats
    }

    /// Advance the transition clock; returns how many transitions landed
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        self.list.tick(elapsed)
    }

    /// Apply next-frame transitions queued by the last update
    pub fn frame(&mut self) -> usize {
        self.list.frame()
    }

    /// Whether no transition is pending or running
    pub fn is_settled(&self) -> bool {
        self.list.is_settled()
    }

    /// Keys of the live rows in display order
    pub fn keys(&self) -> Vec<&str> {
        self.list.keys()
    }

    fn gutter(&self, slot: &Slot<RowLines>) -> String {
        let state = slot.state();
        let enter = self.list.config().enter;
        let fresh = self.list.now().saturating_sub(slot.inserted_at()) < enter;

        if state.leaving {
            self.palette.paint("-", Tone::Leaving)
        } else if state.entering || (fresh && !slot.is_detaching()) {
            self.palette.paint("+", Tone::Entering)
        } else if state.flashing {
            self.palette.paint("~", Tone::Flashing)
        } else {
            " ".to_string()
        }
    }

    /// Full screen contents
    pub fn paint(&self) -> String {
        let mut out = String::new();
        for slot in self.list.slots() {
            let gutter = self.gutter(slot);
            for line in slot.element() {
                let line = line.trim_end();
                let line = if slot.state().leaving {
                    self.palette.paint(line, Tone::Muted)
                } else {
                    line.to_string()
                };
                out.push_str(&format!("{} {}\n", gutter, line));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_core::{BranchLink, BranchRecord};

    fn snapshot(records: Vec<BranchRecord>) -> Snapshot {
        Snapshot {
            branches: records,
            working_copy: None,
        }
    }

    fn two_branches() -> Snapshot {
        snapshot(vec![
            BranchRecord::new("main").up(BranchLink::new("topic")),
            BranchRecord::new("topic").current().down(BranchLink::new("main")),
        ])
    }

    fn surface() -> TerminalSurface {
        TerminalSurface::new(&SystemConfig::default(), Palette::plain())
    }

    #[test]
    fn test_new_rows_enter() {
        let mut surface = surface();
        let stats = surface.update(&two_branches());
        assert_eq!(stats.inserted, 2);

        let painted = surface.paint();
        assert_eq!(painted, "+ ◉ topic\n+ ◯ main\n");

        surface.frame();
        surface.tick(Duration::from_secs(1));
        assert!(surface.is_settled());
        assert_eq!(surface.paint(), "  ◉ topic\n  ◯ main\n");
    }

    #[test]
    fn test_removed_row_leaves_then_detaches() {
        let mut surface = surface();
        surface.update(&two_branches());
        surface.frame();
        surface.tick(Duration::from_secs(1));

        let stats = surface.update(&snapshot(vec![BranchRecord::new("main").current()]));
        assert_eq!(stats.removed, 1);
        assert_eq!(surface.keys(), vec!["main"]);

        let painted = surface.paint();
        assert_eq!(painted.lines().count(), 2);
        assert!(painted.starts_with("- ◉ topic"));

        surface.tick(Duration::from_secs(1));
        assert_eq!(surface.paint().lines().count(), 1);
    }

    #[test]
    fn test_changed_row_flashes() {
        let mut surface = surface();
        surface.update(&two_branches());
        surface.frame();
        surface.tick(Duration::from_secs(1));

        let mut changed = two_branches();
        changed.branches[1].down = Some(BranchLink::restack("main"));
        let stats = surface.update(&changed);
        assert!(stats.updated >= 1);
        assert!(surface.paint().contains("~ ◉ topic (needs restack)"));
    }
}
