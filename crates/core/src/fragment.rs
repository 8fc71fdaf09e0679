//! Fragment calculator: per-row, per-lane drawing instructions
//!
//! Turns ordered rows into everything a drawing layer needs (vertical
//! segments, fork connectors, node glyph style) so that it never has to
//! walk the tree itself.

use crate::order::{OrderedBranch, RowKind};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Drawing state of one lane on one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LaneSegment {
    /// A line enters this cell from the row above
    pub continues_from_above: bool,
    /// A line leaves this cell towards the row below
    pub continues_below: bool,
    /// The row's node sits in this lane
    pub has_node: bool,
    /// Some edge passing through this cell needs restacking
    pub needs_restack: bool,
}

/// Connector from a parent's node up to a child living in another lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildForkStyle {
    pub lane: usize,
    pub needs_restack: bool,
    pub is_uncommitted: bool,
}

/// Glyph style for a row's node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeStyle {
    #[default]
    Normal,
    Current,
    Uncommitted,
}

/// Everything needed to draw the graph part of one row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeFragmentData {
    /// Indexed by lane, `max_lane + 1` long
    pub lanes: Vec<LaneSegment>,
    /// Highest lane used anywhere in the graph
    pub max_lane: usize,
    pub node_lane: usize,
    /// Sorted by lane
    pub child_fork_lanes: Vec<ChildForkStyle>,
    pub node_style: NodeStyle,
    pub node_needs_restack: bool,
}

/// Child-to-parent connection between two rows
#[derive(Debug, Clone, Copy)]
struct Edge {
    child: usize,
    parent: usize,
    child_lane: usize,
    parent_lane: usize,
    needs_restack: bool,
}

impl Edge {
    fn touches(&self, lane: usize) -> bool {
        self.child_lane == lane || self.parent_lane == lane
    }
}

/// Collect every child-to-parent edge, by row index
///
/// Edges whose parent is not listed below the child are dropped; post-order
/// output never produces them.
fn collect_edges(rows: &[OrderedBranch]) -> Vec<Edge> {
    let index: AHashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.name(), idx))
        .collect();

    rows.iter()
        .enumerate()
        .filter_map(|(child, row)| {
            let parent_name = row.position.parent_name.as_deref()?;
            let parent = *index.get(parent_name)?;
            (parent > child).then(|| Edge {
                child,
                parent,
                child_lane: row.position.lane,
                parent_lane: rows[parent].position.lane,
                needs_restack: row.edge_needs_restack(),
            })
        })
        .collect()
}

fn lane_segment(edges: &[Edge], row: usize, row_lane: usize, lane: usize) -> LaneSegment {
    let mut segment = LaneSegment {
        has_node: lane == row_lane,
        ..LaneSegment::default()
    };

    for edge in edges {
        if edge.child < row && edge.parent >= row && edge.touches(lane) {
            // Passing through, or terminating at this row
            segment.continues_from_above = true;
            if edge.parent > row {
                segment.continues_below = true;
            }
            segment.needs_restack |= edge.needs_restack;
        } else if edge.child == row && edge.parent > row && edge.child_lane == lane {
            // This row's own line down to its parent
            segment.continues_below = true;
            segment.needs_restack |= edge.needs_restack;
        }
    }

    segment
}

fn node_style(row: &OrderedBranch) -> NodeStyle {
    match row.kind {
        RowKind::Uncommitted => NodeStyle::Uncommitted,
        RowKind::Branch if row.record.current => NodeStyle::Current,
        RowKind::Branch => NodeStyle::Normal,
    }
}

/// Compute the tree fragment of every row, keyed by row name
pub fn build_tree_fragments(rows: &[OrderedBranch]) -> BTreeMap<String, TreeFragmentData> {
    let max_lane = rows.iter().map(|row| row.position.lane).max().unwrap_or(0);
    let edges = collect_edges(rows);

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_lane = row.position.lane;

            let lanes = (0..=max_lane)
                .map(|lane| lane_segment(&edges, idx, row_lane, lane))
                .collect();

            let mut child_fork_lanes: Vec<ChildForkStyle> = edges
                .iter()
                .filter(|edge| edge.parent == idx && edge.child_lane != row_lane)
                .map(|edge| ChildForkStyle {
                    lane: edge.child_lane,
                    needs_restack: edge.needs_restack,
                    is_uncommitted: rows[edge.child].kind == RowKind::Uncommitted,
                })
                .collect();
            child_fork_lanes.sort_by_key(|fork| fork.lane);

            let fragment = TreeFragmentData {
                lanes,
                max_lane,
                node_lane: row_lane,
                child_fork_lanes,
                node_style: node_style(row),
                node_needs_restack: row.kind == RowKind::Branch && row.record.needs_restack(),
            };

            (row.name().to_string(), fragment)
        })
        .collect()
}
