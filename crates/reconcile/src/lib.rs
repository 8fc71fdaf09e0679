//! Keyed, animation-aware list reconciliation
//!
//! This crate provides:
//! - `diff_list`: keyed diff/patch of a visual list against a new snapshot
//! - Enter, exit and flash transition contracts
//! - A cooperative scheduler with a logical clock driving those transitions
//!
//! Everything runs on the caller's thread. Transition completions are
//! queued as data and applied when the owner ticks the list, after checking
//! that the target element is still attached.

pub mod animate;
pub mod list;
pub mod scheduler;

// Re-exports
pub use animate::{Animator, ElementId, Transition, TransitionConfig, VisualState};
pub use list::{diff_list, DiffStats, FnRenderer, KeyedList, RowRenderer, Slot};
pub use scheduler::Scheduler;
