//! Graph ordering: branch records to a post-order row sequence
//!
//! Rows are emitted children-first, so a stack reads top to bottom from the
//! newest branch down to trunk:
//!
//! ```text
//! ● feature-2
//! │ ● feature-b
//! ● ┘ feature-1
//! ● main
//! ```
//!
//! The first child of a branch stays in its parent's lane; every further
//! child forks into a fresh lane taken from a counter shared by the whole
//! traversal.

use crate::model::{BranchLink, BranchRecord};
use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::debug;

/// Key of the synthetic uncommitted-changes row. `~` cannot appear in a git
/// ref name, so this never collides with a real branch.
pub const UNCOMMITTED_KEY: &str = "~uncommitted";

/// What a row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A real branch from the snapshot
    Branch,
    /// The synthetic row for uncommitted working-copy changes
    Uncommitted,
}

/// Where a branch sits in the stack tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePosition {
    /// Distance from the root (roots are 0)
    pub depth: usize,
    pub is_last_child: bool,
    /// One entry per level below the root: whether the node on the path at
    /// that level is the last of its siblings. Always `depth` long.
    pub ancestor_is_last: SmallVec<[bool; 8]>,
    /// Parent the branch was reached through; `None` for roots
    pub parent_name: Option<String>,
    pub sibling_index: usize,
    pub sibling_count: usize,
    /// Column the branch is drawn in
    pub lane: usize,
}

/// A branch together with its computed tree position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedBranch {
    pub record: BranchRecord,
    pub position: TreePosition,
    pub kind: RowKind,
}

impl OrderedBranch {
    /// Row key
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Whether the edge from this row to its parent row needs restacking
    pub fn edge_needs_restack(&self) -> bool {
        match (&self.record.down, &self.position.parent_name) {
            (Some(link), Some(parent)) => link.name == *parent && link.needs_restack,
            _ => false,
        }
    }
}

/// Per-node state threaded down the recursion
struct Frame<'a> {
    depth: usize,
    parent: Option<&'a str>,
    sibling_index: usize,
    sibling_count: usize,
    is_last: bool,
    ancestor_is_last: SmallVec<[bool; 8]>,
    lane: usize,
}

/// Shared traversal state: visited names, the lane counter and the output
struct Traversal<'a> {
    by_name: AHashMap<&'a str, &'a BranchRecord>,
    visited: AHashSet<&'a str>,
    next_lane: usize,
    rows: Vec<OrderedBranch>,
}

impl<'a> Traversal<'a> {
    fn new(by_name: AHashMap<&'a str, &'a BranchRecord>) -> Self {
        let capacity = by_name.len();
        Self {
            by_name,
            visited: AHashSet::with_capacity(capacity),
            next_lane: 0,
            rows: Vec::with_capacity(capacity),
        }
    }

    fn alloc_lane(&mut self) -> usize {
        let lane = self.next_lane;
        self.next_lane += 1;
        lane
    }

    fn visit_root(&mut self, record: &'a BranchRecord) {
        if self.visited.contains(record.name.as_str()) {
            return;
        }

        let lane = self.alloc_lane();
        self.visit(
            record,
            Frame {
                depth: 0,
                parent: None,
                sibling_index: 0,
                sibling_count: 1,
                is_last: true,
                ancestor_is_last: SmallVec::new(),
                lane,
            },
        );
    }

    fn visit(&mut self, record: &'a BranchRecord, frame: Frame<'a>) {
        if !self.visited.insert(record.name.as_str()) {
            debug!(branch = %record.name, "branch already visited, skipping");
            return;
        }

        let children = self.children_of(record);
        let count = children.len();

        for (index, child) in children.into_iter().enumerate() {
            if self.visited.contains(child.name.as_str()) {
                debug!(
                    branch = %child.name,
                    parent = %record.name,
                    "child already visited (cycle?), skipping"
                );
                continue;
            }

            let lane = if index == 0 {
                frame.lane
            } else {
                self.alloc_lane()
            };
            let is_last = index + 1 == count;
            let mut ancestor_is_last = frame.ancestor_is_last.clone();
            ancestor_is_last.push(is_last);

            self.visit(
                child,
                Frame {
                    depth: frame.depth + 1,
                    parent: Some(record.name.as_str()),
                    sibling_index: index,
                    sibling_count: count,
                    is_last,
                    ancestor_is_last,
                    lane,
                },
            );
        }

        self.rows.push(OrderedBranch {
            record: record.clone(),
            position: TreePosition {
                depth: frame.depth,
                is_last_child: frame.is_last,
                ancestor_is_last: frame.ancestor_is_last,
                parent_name: frame.parent.map(str::to_string),
                sibling_index: frame.sibling_index,
                sibling_count: frame.sibling_count,
                lane: frame.lane,
            },
            kind: RowKind::Branch,
        });
    }

    /// Children present in the input, alphabetical, without duplicates
    fn children_of(&self, record: &BranchRecord) -> Vec<&'a BranchRecord> {
        let mut children: Vec<&'a BranchRecord> = record
            .up
            .iter()
            .filter_map(|link| self.by_name.get(link.name.as_str()).copied())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children.dedup_by(|a, b| a.name == b.name);
        children
    }
}

/// Order branch records into post-order rows with lane assignments
///
/// Malformed input never fails:
/// - parents missing from the input make a branch a root
/// - duplicate names keep the last record
/// - branches only reachable through a cycle become extra roots, in input
///   order, after all real roots
pub fn order_stack(records: &[BranchRecord]) -> Vec<OrderedBranch> {
    let mut by_name: AHashMap<&str, &BranchRecord> = AHashMap::with_capacity(records.len());
    for record in records {
        if by_name.insert(record.name.as_str(), record).is_some() {
            debug!(branch = %record.name, "duplicate branch name, keeping last record");
        }
    }

    let mut roots: Vec<&BranchRecord> = by_name
        .values()
        .copied()
        .filter(|record| match &record.down {
            None => true,
            Some(link) => !by_name.contains_key(link.name.as_str()),
        })
        .collect();
    roots.sort_by(|a, b| a.name.cmp(&b.name));

    if roots.is_empty() && !records.is_empty() {
        debug!(
            count = records.len(),
            "no root branch found, treating every branch as a root"
        );
    }

    let mut traversal = Traversal::new(by_name);
    for root in roots {
        traversal.visit_root(root);
    }

    // Anything left is only reachable through a cycle
    for record in records {
        if traversal.visited.contains(record.name.as_str()) {
            continue;
        }
        let Some(&winner) = traversal.by_name.get(record.name.as_str()) else {
            continue;
        };
        debug!(branch = %record.name, "unreachable branch, treating as extra root");
        traversal.visit_root(winner);
    }

    traversal.rows
}

/// Insert the uncommitted-changes row as the last child of the current branch
///
/// The row stays in the current branch's lane when that branch has no
/// children of its own, otherwise it forks into a new lane to the right of
/// every existing one. Existing children gain one sibling and lose their
/// last-child flag. Rows are returned unchanged when no branch is checked
/// out.
pub fn insert_uncommitted_row(mut rows: Vec<OrderedBranch>) -> Vec<OrderedBranch> {
    let Some(current_idx) = rows
        .iter()
        .position(|row| row.kind == RowKind::Branch && row.record.current)
    else {
        debug!("no current branch, skipping uncommitted row");
        return rows;
    };

    let current = &rows[current_idx];
    let current_name = current.record.name.clone();
    let current_depth = current.position.depth;
    let current_lane = current.position.lane;
    let mut ancestor_is_last = current.position.ancestor_is_last.clone();
    ancestor_is_last.push(true);

    let mut child_count = 0;
    let mut prev_last = None;
    for (idx, row) in rows.iter_mut().enumerate() {
        if row.position.parent_name.as_deref() != Some(current_name.as_str()) {
            continue;
        }
        child_count += 1;
        row.position.sibling_count += 1;
        if row.position.is_last_child {
            row.position.is_last_child = false;
            prev_last = Some(idx);
        }
    }

    // The old last child and its subtree now have a sibling below them.
    // In post-order that subtree is the run of deeper rows ending at it.
    if let Some(last_idx) = prev_last {
        let (subtree, last) = rows[..=last_idx].split_at_mut(last_idx);
        let descendants = subtree
            .iter_mut()
            .rev()
            .take_while(|row| row.position.depth > current_depth + 1);
        for row in descendants.chain(last.iter_mut()) {
            if let Some(flag) = row.position.ancestor_is_last.get_mut(current_depth) {
                *flag = false;
            }
        }
    }

    let lane = if child_count == 0 {
        current_lane
    } else {
        rows.iter().map(|row| row.position.lane).max().unwrap_or(0) + 1
    };

    let row = OrderedBranch {
        record: BranchRecord::new(UNCOMMITTED_KEY).down(BranchLink::new(current_name.clone())),
        position: TreePosition {
            depth: current_depth + 1,
            is_last_child: true,
            ancestor_is_last,
            parent_name: Some(current_name),
            sibling_index: child_count,
            sibling_count: child_count + 1,
            lane,
        },
        kind: RowKind::Uncommitted,
    };

    // Last child, so it sits directly above its parent
    rows.insert(current_idx, row);
    rows
}
