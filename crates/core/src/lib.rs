//! Stack graph layout for stackview
//!
//! This crate provides:
//! - Branch record model and JSON snapshot input
//! - Post-order graph ordering with lane assignment
//! - Per-row connector geometry (tree fragments)
//! - View-model assembly for the reconciliation engine
//! - Commit paging
//!
//! Nothing in here does I/O beyond parsing a snapshot from a reader, and
//! nothing fails on malformed stacks: missing parents, cycles and duplicate
//! names are absorbed by the layout.

pub mod fragment;
pub mod model;
pub mod order;
pub mod pager;
pub mod snapshot;
pub mod view_model;

// Re-exports
pub use fragment::{build_tree_fragments, ChildForkStyle, LaneSegment, NodeStyle, TreeFragmentData};
pub use model::{BranchLink, BranchRecord, ChangeSummary, CommitSummary, FileChange, WorkingCopy};
pub use order::{insert_uncommitted_row, order_stack, OrderedBranch, RowKind, TreePosition, UNCOMMITTED_KEY};
pub use pager::{CommitPage, CommitPager, ViewConfig, DEFAULT_COMMIT_CHUNK};
pub use snapshot::{Snapshot, SnapshotError};
pub use view_model::{build_view_models, BranchViewModel};
