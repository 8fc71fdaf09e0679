//! Cooperative task scheduler with a logical clock
//!
//! Work is queued either for the next frame or for a point in time. Nothing
//! runs on its own: the owner drives the clock with [`Scheduler::advance`]
//! and drains frame work with [`Scheduler::take_frame`], then applies the
//! returned tasks itself. Tasks are plain data, so whoever applies them can
//! check that their target still exists first.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// A task due at a point on the logical clock
#[derive(Debug)]
struct Timer<T> {
    due: Duration,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
    task: T,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Deterministic scheduler for frame and timer work
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    seq: u64,
    timers: BinaryHeap<Reverse<Timer<T>>>,
    frame: Vec<T>,
}

impl<T> Scheduler<T> {
    /// Create a scheduler with its clock at zero
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            timers: BinaryHeap::new(),
            frame: Vec::new(),
        }
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed
    pub fn after(&mut self, delay: Duration, task: T) {
        let timer = Timer {
            due: self.now + delay,
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.timers.push(Reverse(timer));
    }

    /// Run `task` on the next frame
    pub fn next_frame(&mut self, task: T) {
        self.frame.push(task);
    }

    /// Move the clock forward and return every timer that came due, in
    /// deadline order
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;

        let now = self.now;
        let mut due = Vec::new();
        while self
            .timers
            .peek()
            .is_some_and(|Reverse(timer)| timer.due <= now)
        {
            if let Some(Reverse(timer)) = self.timers.pop() {
                due.push(timer.task);
            }
        }
        due
    }

    /// Drain the work queued for the next frame
    pub fn take_frame(&mut self) -> Vec<T> {
        std::mem::take(&mut self.frame)
    }

    /// Time until the earliest timer, if any
    pub fn next_due(&self) -> Option<Duration> {
        self.timers
            .peek()
            .map(|Reverse(timer)| timer.due.saturating_sub(self.now))
    }

    /// Whether any frame or timer work is queued
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.frame.is_empty()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.timers.len() + self.frame.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
