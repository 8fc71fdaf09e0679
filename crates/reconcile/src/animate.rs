//! Animation orchestrator: enter, exit and flash transitions
//!
//! Each transition sets a visual state flag right away and schedules the
//! work that finishes it. None of them complete synchronously; the keyed
//! list applies the scheduled [`Transition`]s when the clock reaches them
//! and checks that the element is still attached before touching it.

use crate::scheduler::Scheduler;
use std::time::Duration;
use tracing::trace;

/// Handle identifying one visual element for its whole lifetime
///
/// Handles are never reused, so a task scheduled for an element that has
/// since been detached can never hit a newer element with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u64);

/// Transition timing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionConfig {
    /// Length of the entrance animation
    pub enter: Duration,
    /// Time between flagging an element as leaving and detaching it
    pub exit: Duration,
    /// How long the "just changed" highlight stays on
    pub flash: Duration,
    /// Extra delay per element when an entire list is cleared
    pub stagger: Duration,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enter: Duration::from_millis(300),
            exit: Duration::from_millis(300),
            flash: Duration::from_millis(600),
            stagger: Duration::from_millis(30),
        }
    }
}

/// Visual state flags of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisualState {
    /// Just inserted, cleared on the next frame
    pub entering: bool,
    /// On its way out
    pub leaving: bool,
    /// Content just changed
    pub flashing: bool,
    /// Bumped by every flash so stale clears are ignored
    flash_generation: u64,
}

impl VisualState {
    /// Whether no transition state is applied
    pub fn is_settled(&self) -> bool {
        !self.entering && !self.leaving && !self.flashing
    }
}

/// Deferred half of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Drop the "new" state (next frame)
    ClearEnter(ElementId),
    /// Apply the "leaving" state to an element whose exit was staggered
    BeginExit(ElementId),
    /// Exit finished, detach the element if it is still attached
    Detach(ElementId),
    /// Drop the highlight applied by flash number `generation`
    ClearFlash { id: ElementId, generation: u64 },
}

impl Transition {
    /// Element the transition applies to
    pub fn target(&self) -> ElementId {
        match *self {
            Transition::ClearEnter(id)
            | Transition::BeginExit(id)
            | Transition::Detach(id)
            | Transition::ClearFlash { id, .. } => id,
        }
    }
}

/// Starts transitions and queues their completion
#[derive(Debug, Default)]
pub struct Animator {
    config: TransitionConfig,
    scheduler: Scheduler<Transition>,
}

impl Animator {
    /// Create an animator with the given timings
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            scheduler: Scheduler::new(),
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Apply the "new" state; it is removed on the next frame
    pub fn enter(&mut self, id: ElementId, state: &mut VisualState) {
        state.entering = true;
        self.scheduler.next_frame(Transition::ClearEnter(id));
        trace!(?id, "enter");
    }

    /// Apply the "leaving" state after `delay`, detach once the exit
    /// duration has passed on top of that
    pub fn exit(&mut self, id: ElementId, state: &mut VisualState, delay: Duration) {
        if delay.is_zero() {
            state.leaving = true;
        } else {
            self.scheduler.after(delay, Transition::BeginExit(id));
        }
        self.scheduler
            .after(delay + self.config.exit, Transition::Detach(id));
        trace!(?id, ?delay, "exit");
    }

    /// Briefly highlight an element; repeated calls restart the highlight
    pub fn flash(&mut self, id: ElementId, state: &mut VisualState) {
        // A new generation supersedes any running highlight
        state.flash_generation += 1;
        state.flashing = true;

        self.scheduler.after(
            self.config.flash,
            Transition::ClearFlash {
                id,
                generation: state.flash_generation,
            },
        );
        trace!(?id, generation = state.flash_generation, "flash");
    }

    /// Advance the clock, returning the transitions that came due
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Transition> {
        self.scheduler.advance(elapsed)
    }

    /// Work queued for the next frame
    pub fn take_frame(&mut self) -> Vec<Transition> {
        self.scheduler.take_frame()
    }

    /// Time until the next timed transition
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Whether every started transition has finished
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }
}

/// Apply a due transition to an element's state
///
/// Returns `true` when the element should be detached.
pub fn complete(transition: Transition, state: &mut VisualState) -> bool {
    match transition {
        Transition::ClearEnter(_) => {
            state.entering = false;
            false
        }
        Transition::BeginExit(_) => {
            state.leaving = true;
            false
        }
        Transition::Detach(_) => true,
        Transition::ClearFlash { generation, .. } => {
            if state.flash_generation == generation {
                state.flashing = false;
            }
            false
        }
    }
}
