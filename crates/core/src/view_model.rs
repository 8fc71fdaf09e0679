//! View-model assembler
//!
//! Joins ordering, fragments and the domain fields of each branch into one
//! immutable record per row. A fresh list is built for every snapshot and
//! handed to the reconciliation engine, which diffs it against the last one.

use crate::fragment::{build_tree_fragments, TreeFragmentData};
use crate::model::{BranchRecord, ChangeSummary, CommitSummary, FileChange, WorkingCopy};
use crate::order::{insert_uncommitted_row, order_stack, RowKind, TreePosition};
use crate::snapshot::Snapshot;
use tracing::trace;

/// Everything the rendering layer needs to draw one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchViewModel {
    /// Row key
    pub name: String,
    pub kind: RowKind,
    pub current: bool,
    pub needs_restack: bool,
    pub position: TreePosition,
    pub fragment: TreeFragmentData,
    pub change: Option<ChangeSummary>,
    pub commits: Option<Vec<CommitSummary>>,
    /// Only set on the uncommitted-changes row
    pub uncommitted_files: Option<Vec<FileChange>>,
}

impl BranchViewModel {
    /// Whether this is the synthetic uncommitted-changes row
    pub fn is_uncommitted(&self) -> bool {
        self.kind == RowKind::Uncommitted
    }
}

/// Build the ordered view models for one render pass
///
/// A dirty working copy adds the uncommitted-changes row above the current
/// branch.
pub fn build_view_models(
    records: &[BranchRecord],
    working_copy: Option<&WorkingCopy>,
) -> Vec<BranchViewModel> {
    let mut rows = order_stack(records);
    let dirty = working_copy.filter(|wc| wc.is_dirty());
    if dirty.is_some() {
        rows = insert_uncommitted_row(rows);
    }

    let mut fragments = build_tree_fragments(&rows);
    trace!(rows = rows.len(), "assembling view models");

    rows.into_iter()
        .filter_map(|row| {
            let fragment = fragments.remove(row.name())?;
            let uncommitted_files = match row.kind {
                RowKind::Uncommitted => dirty.map(|wc| wc.files.clone()),
                RowKind::Branch => None,
            };

            Some(BranchViewModel {
                needs_restack: row.kind == RowKind::Branch && row.record.needs_restack(),
                current: row.record.current,
                kind: row.kind,
                position: row.position,
                fragment,
                uncommitted_files,
                name: row.record.name,
                change: row.record.change,
                commits: row.record.commits,
            })
        })
        .collect()
}

impl Snapshot {
    /// View models for this snapshot
    pub fn view_models(&self) -> Vec<BranchViewModel> {
        build_view_models(&self.branches, self.working_copy.as_ref())
    }
}
