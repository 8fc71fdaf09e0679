//! Keyed list surface and the `diff_list` reconciliation pass
//!
//! A [`KeyedList`] holds visual elements in display order. Every element
//! lives in a [`Slot`]: the outer wrapper that keeps its handle and
//! transition state while the inner element is re-rendered in place.
//!
//! Reconciling against a new item list runs two passes:
//! 1. Removal: live elements whose key is gone start their exit transition
//!    and stop counting as live right away. They stay attached until the
//!    exit completes.
//! 2. Insert/update/reorder: walk the new items in order, reuse the live
//!    element for a key (re-rendering and flashing it when its content
//!    changed), create and enter new ones, and move anything not directly
//!    after the previously placed element.
//!
//! The last item applied for each key is kept in a side table, so change
//! detection never needs to read anything back from an element.

use crate::animate::{complete, Animator, ElementId, Transition, TransitionConfig, VisualState};
use ahash::{AHashMap, AHashSet};
use std::time::Duration;
use tracing::{debug, trace};

/// Element-rendering functions injected by the surrounding application
pub trait RowRenderer<T> {
    /// Visual element produced for an item
    type Element;

    /// Stable identity of an item
    fn key(&self, item: &T) -> String;

    /// Build a fresh element
    fn render(&self, item: &T) -> Self::Element;

    /// Whether `new` differs from the last applied `old` enough to re-render
    fn needs_update(&self, old: &T, new: &T) -> bool;

    /// Re-render an existing element in place
    fn update(&self, element: &mut Self::Element, item: &T) {
        *element = self.render(item);
    }
}

/// [`RowRenderer`] built from plain functions
pub struct FnRenderer<K, R, U> {
    key: K,
    render: R,
    needs_update: U,
}

impl<K, R, U> FnRenderer<K, R, U> {
    pub fn new(key: K, render: R, needs_update: U) -> Self {
        Self {
            key,
            render,
            needs_update,
        }
    }
}

impl<T, E, K, R, U> RowRenderer<T> for FnRenderer<K, R, U>
where
    K: Fn(&T) -> String,
    R: Fn(&T) -> E,
    U: Fn(&T, &T) -> bool,
{
    type Element = E;

    fn key(&self, item: &T) -> String {
        (self.key)(item)
    }

    fn render(&self, item: &T) -> E {
        (self.render)(item)
    }

    fn needs_update(&self, old: &T, new: &T) -> bool {
        (self.needs_update)(old, new)
    }
}

/// Outer wrapper of one visual element
#[derive(Debug)]
pub struct Slot<E> {
    id: ElementId,
    key: String,
    element: E,
    state: VisualState,
    /// Flagged for exit; no longer matched by key
    detaching: bool,
    inserted_at: Duration,
}

impl<E> Slot<E> {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn state(&self) -> &VisualState {
        &self.state
    }

    /// Whether the element has been flagged for exit
    pub fn is_detaching(&self) -> bool {
        self.detaching
    }

    /// Logical time at which the element was first inserted
    pub fn inserted_at(&self) -> Duration {
        self.inserted_at
    }
}

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub inserted: usize,
    pub updated: usize,
    pub moved: usize,
    pub removed: usize,
}

/// Container of keyed visual elements driven by [`diff_list`]
#[derive(Debug)]
pub struct KeyedList<T, E> {
    /// Attached elements in display order, leaving ones included
    slots: Vec<Slot<E>>,
    /// Key to live (not detaching) element
    live: AHashMap<String, ElementId>,
    /// Key to the item last applied to its element
    snapshots: AHashMap<String, T>,
    animator: Animator,
    next_id: u64,
}

impl<T, E> KeyedList<T, E> {
    /// Create an empty list with the given transition timings
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            slots: Vec::new(),
            live: AHashMap::new(),
            snapshots: AHashMap::new(),
            animator: Animator::new(config),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        self.animator.config()
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.animator.now()
    }

    /// Attached elements in display order, including ones mid-exit
    pub fn slots(&self) -> impl Iterator<Item = &Slot<E>> {
        self.slots.iter()
    }

    /// Keys of live elements in display order
    pub fn keys(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| !slot.detaching)
            .map(|slot| slot.key.as_str())
            .collect()
    }

    /// Handle of the live element for `key`
    pub fn element_id(&self, key: &str) -> Option<ElementId> {
        self.live.get(key).copied()
    }

    /// Live element for `key`
    pub fn get(&self, key: &str) -> Option<&Slot<E>> {
        let id = self.element_id(key)?;
        self.slot(id)
    }

    /// Last item applied for `key`
    pub fn snapshot(&self, key: &str) -> Option<&T> {
        self.snapshots.get(key)
    }

    /// Number of attached elements, including ones mid-exit
    pub fn attached(&self) -> usize {
        self.slots.len()
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether every transition has run to completion
    pub fn is_settled(&self) -> bool {
        self.animator.is_idle()
    }

    /// Time until the next timed transition
    pub fn next_due(&self) -> Option<Duration> {
        self.animator.next_due()
    }

    /// Advance the clock and apply every transition that came due
    ///
    /// Returns the number of transitions that changed something.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        let due = self.animator.advance(elapsed);
        self.apply_all(due)
    }

    /// Apply work queued for the next frame; call after each paint
    pub fn frame(&mut self) -> usize {
        let due = self.animator.take_frame();
        self.apply_all(due)
    }

    fn apply_all(&mut self, transitions: Vec<Transition>) -> usize {
        transitions
            .into_iter()
            .filter(|&transition| self.apply(transition))
            .count()
    }

    fn apply(&mut self, transition: Transition) -> bool {
        let id = transition.target();
        // Detached in the meantime: nothing to do
        let Some(idx) = self.position(id) else {
            trace!(?id, ?transition, "transition target no longer attached");
            return false;
        };

        if complete(transition, &mut self.slots[idx].state) {
            let slot = self.slots.remove(idx);
            debug!(key = %slot.key, ?id, "detached element");
        }
        true
    }

    fn position(&self, id: ElementId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    fn slot(&self, id: ElementId) -> Option<&Slot<E>> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    fn alloc_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Index right after the previously placed element, or the front
    fn insert_index(&self, prev: Option<ElementId>) -> usize {
        prev.and_then(|id| self.position(id))
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    /// Whether the slot at `idx` already follows `prev`, ignoring elements
    /// that are on their way out
    fn follows(&self, idx: usize, prev: Option<ElementId>) -> bool {
        let start = self.insert_index(prev);
        if prev.is_some() && start == 0 {
            return false;
        }
        start <= idx && self.slots[start..idx].iter().all(|slot| slot.detaching)
    }
}

impl<T, E> Default for KeyedList<T, E> {
    fn default() -> Self {
        Self::new(TransitionConfig::default())
    }
}

/// Reconcile `list` so its live elements match `items`, in order
///
/// Duplicate keys in `items` keep the last occurrence, at that position.
/// An empty `items` exits every element, staggered by the configured delay.
pub fn diff_list<T, R>(list: &mut KeyedList<T, R::Element>, items: &[T], renderer: &R) -> DiffStats
where
    T: Clone,
    R: RowRenderer<T>,
{
    let mut stats = DiffStats::default();

    // Last occurrence of each key wins
    let keyed: Vec<(String, &T)> = items
        .iter()
        .map(|item| (renderer.key(item), item))
        .collect();
    let mut last_index: AHashMap<&str, usize> = AHashMap::with_capacity(keyed.len());
    for (idx, (key, _)) in keyed.iter().enumerate() {
        if last_index.insert(key.as_str(), idx).is_some() {
            debug!(key = %key, "duplicate key in new list, last one wins");
        }
    }
    let wanted: Vec<(&str, &T)> = keyed
        .iter()
        .enumerate()
        .filter(|(idx, (key, _))| last_index.get(key.as_str()) == Some(idx))
        .map(|(_, (key, item))| (key.as_str(), *item))
        .collect();
    let wanted_keys: AHashSet<&str> = wanted.iter().map(|(key, _)| *key).collect();

    // 1. Removal pass
    let clearing_all = wanted.is_empty();
    let stagger = list.config().stagger;
    let mut exits = 0u32;
    for slot in list.slots.iter_mut() {
        if slot.detaching || wanted_keys.contains(slot.key.as_str()) {
            continue;
        }

        let delay = if clearing_all {
            stagger * exits
        } else {
            Duration::ZERO
        };
        slot.detaching = true;
        list.animator.exit(slot.id, &mut slot.state, delay);
        list.live.remove(&slot.key);
        list.snapshots.remove(&slot.key);
        exits += 1;
    }
    stats.removed = exits as usize;

    // 2. Insert / update / reorder pass
    let now = list.now();
    let mut prev: Option<ElementId> = None;
    for (key, item) in wanted {
        let id = match list.live.get(key).copied() {
            Some(id) => {
                let changed = list
                    .snapshots
                    .get(key)
                    .map_or(true, |old| renderer.needs_update(old, item));

                let Some(mut idx) = list.position(id) else {
                    // Live map and slots disagree; should not happen
                    debug!(key, ?id, "live element missing from container");
                    list.live.remove(key);
                    continue;
                };

                if changed {
                    let slot = &mut list.slots[idx];
                    renderer.update(&mut slot.element, item);
                    list.animator.flash(id, &mut slot.state);
                    stats.updated += 1;
                }
                list.snapshots.insert(key.to_string(), item.clone());

                if !list.follows(idx, prev) {
                    let slot = list.slots.remove(idx);
                    idx = list.insert_index(prev);
                    list.slots.insert(idx, slot);
                    stats.moved += 1;
                }
                id
            }
            None => {
                let id = list.alloc_id();
                let mut slot = Slot {
                    id,
                    key: key.to_string(),
                    element: renderer.render(item),
                    state: VisualState::default(),
                    detaching: false,
                    inserted_at: now,
                };
                list.animator.enter(id, &mut slot.state);

                let idx = list.insert_index(prev);
                list.slots.insert(idx, slot);
                list.live.insert(key.to_string(), id);
                list.snapshots.insert(key.to_string(), item.clone());
                stats.inserted += 1;
                id
            }
        };

        prev = Some(id);
    }

    trace!(?stats, live = list.live.len(), attached = list.slots.len(), "diff_list");
    stats
}

impl<T: Clone, E> KeyedList<T, E> {
    /// Reconcile against `items`; see [`diff_list`]
    pub fn reconcile<R>(&mut self, items: &[T], renderer: &R) -> DiffStats
    where
        R: RowRenderer<T, Element = E>,
    {
        diff_list(self, items, renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        key: &'static str,
        label: &'static str,
    }

    fn row(key: &'static str) -> Row {
        Row { key, label: key }
    }

    fn renderer() -> impl RowRenderer<Row, Element = String> {
        FnRenderer::new(
            |row: &Row| row.key.to_string(),
            |row: &Row| format!("<{}>", row.label),
            |old: &Row, new: &Row| old != new,
        )
    }

    fn config() -> TransitionConfig {
        TransitionConfig {
            enter: Duration::from_millis(100),
            exit: Duration::from_millis(200),
            flash: Duration::from_millis(400),
            stagger: Duration::from_millis(50),
        }
    }

    fn list_with(items: &[Row]) -> KeyedList<Row, String> {
        let mut list = KeyedList::new(config());
        diff_list(&mut list, items, &renderer());
        list.frame();
        list.tick(Duration::from_secs(10));
        list
    }

    fn attached_keys(list: &KeyedList<Row, String>) -> Vec<&str> {
        list.slots().map(|slot| slot.key()).collect()
    }

    #[test]
    fn test_initial_render_enters_everything() {
        let mut list = KeyedList::new(config());
        let stats = diff_list(&mut list, &[row("a"), row("b")], &renderer());

        assert_eq!(stats.inserted, 2);
        assert_eq!(list.keys(), vec!["a", "b"]);
        assert!(list.slots().all(|slot| slot.state().entering));

        list.frame();
        assert!(list.slots().all(|slot| slot.state().is_settled()));
    }

    #[test]
    fn test_append_keeps_existing_element() {
        let mut list = list_with(&[row("a")]);
        let a = list.element_id("a").unwrap();

        let stats = diff_list(&mut list, &[row("a"), row("b")], &renderer());

        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.updated, 0);
        assert_eq!(list.element_id("a"), Some(a));
        assert!(list.get("b").unwrap().state().entering);
        assert!(!list.get("a").unwrap().state().flashing);
        assert_eq!(list.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_removed_element_detaches_after_exit() {
        let mut list = list_with(&[row("a"), row("b")]);
        let stats = diff_list(&mut list, &[row("a")], &renderer());

        assert_eq!(stats.removed, 1);
        assert_eq!(list.keys(), vec!["a"]);
        // Still attached while it animates out
        assert_eq!(attached_keys(&list), vec!["a", "b"]);
        assert!(list.slots().nth(1).unwrap().state().leaving);

        list.tick(Duration::from_millis(199));
        assert_eq!(list.attached(), 2);
        list.tick(Duration::from_millis(1));
        assert_eq!(attached_keys(&list), vec!["a"]);
    }

    #[test]
    fn test_changed_content_updates_in_place() {
        let mut list = list_with(&[row("a")]);
        let a = list.element_id("a").unwrap();

        let changed = Row { key: "a", label: "A!" };
        let stats = diff_list(&mut list, &[changed.clone()], &renderer());

        assert_eq!(stats.updated, 1);
        let slot = list.get("a").unwrap();
        assert_eq!(slot.id(), a);
        assert_eq!(slot.element(), "<A!>");
        assert!(slot.state().flashing);
        assert_eq!(list.snapshot("a"), Some(&changed));

        list.tick(Duration::from_millis(400));
        assert!(!list.get("a").unwrap().state().flashing);
    }

    #[test]
    fn test_reorder_moves_elements() {
        let mut list = list_with(&[row("a"), row("b"), row("c")]);
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|key| list.element_id(key).unwrap())
            .collect();

        let stats = diff_list(&mut list, &[row("c"), row("a"), row("b")], &renderer());

        assert_eq!(list.keys(), vec!["c", "a", "b"]);
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(list.element_id("a"), Some(ids[0]));
        assert_eq!(list.element_id("b"), Some(ids[1]));
        assert_eq!(list.element_id("c"), Some(ids[2]));
    }

    #[test]
    fn test_clearing_list_staggers_exits() {
        let mut list = list_with(&[row("a"), row("b"), row("c")]);
        let stats = diff_list(&mut list, &[], &renderer());

        assert_eq!(stats.removed, 3);
        assert!(list.is_empty());
        let leaving: Vec<bool> = list.slots().map(|slot| slot.state().leaving).collect();
        assert_eq!(leaving, vec![true, false, false]);

        list.tick(Duration::from_millis(50));
        let leaving: Vec<bool> = list.slots().map(|slot| slot.state().leaving).collect();
        assert_eq!(leaving, vec![true, true, false]);

        list.tick(Duration::from_millis(150));
        assert_eq!(attached_keys(&list), vec!["b", "c"]);

        list.tick(Duration::from_millis(100));
        assert_eq!(list.attached(), 0);
    }

    #[test]
    fn test_reappearing_key_gets_new_element() {
        let mut list = list_with(&[row("a"), row("b")]);
        let old_b = list.element_id("b").unwrap();

        diff_list(&mut list, &[row("a")], &renderer());
        diff_list(&mut list, &[row("a"), row("b")], &renderer());

        let new_b = list.element_id("b").unwrap();
        assert_ne!(old_b, new_b);
        assert_eq!(list.keys(), vec!["a", "b"]);
        assert_eq!(list.attached(), 3);

        // The old element's exit completes without touching the new one
        list.tick(Duration::from_millis(200));
        assert_eq!(attached_keys(&list), vec!["a", "b"]);
        assert_eq!(list.element_id("b"), Some(new_b));
    }

    #[test]
    fn test_back_to_back_calls_settle_to_latest() {
        let mut list = list_with(&[row("a"), row("b"), row("c")]);

        diff_list(&mut list, &[row("b")], &renderer());
        diff_list(&mut list, &[row("c"), row("b"), row("d")], &renderer());
        list.frame();
        list.tick(Duration::from_secs(1));

        assert_eq!(list.keys(), vec!["c", "b", "d"]);
        assert_eq!(attached_keys(&list), vec!["c", "b", "d"]);
        assert!(list.is_settled());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let mut list = KeyedList::new(config());
        let first = Row { key: "a", label: "first" };
        let second = Row { key: "a", label: "second" };

        diff_list(&mut list, &[first, row("b"), second], &renderer());

        assert_eq!(list.keys(), vec!["b", "a"]);
        assert_eq!(list.get("a").unwrap().element(), "<second>");
    }

    #[test]
    fn test_new_element_inserted_after_previous() {
        let mut list = list_with(&[row("a"), row("c")]);
        diff_list(&mut list, &[row("a"), row("b"), row("c")], &renderer());
        assert_eq!(list.keys(), vec!["a", "b", "c"]);

        diff_list(&mut list, &[row("z"), row("a"), row("b"), row("c")], &renderer());
        assert_eq!(list.keys(), vec!["z", "a", "b", "c"]);
    }

    #[test]
    fn test_leaving_elements_do_not_force_moves() {
        let mut list = list_with(&[row("a"), row("b"), row("c")]);
        let stats = diff_list(&mut list, &[row("a"), row("c")], &renderer());

        assert_eq!(stats.moved, 0);
        assert_eq!(attached_keys(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unchanged_rerender_is_a_no_op() {
        let mut list = list_with(&[row("a"), row("b")]);
        let stats = diff_list(&mut list, &[row("a"), row("b")], &renderer());

        assert_eq!(stats, DiffStats::default());
        assert!(list.slots().all(|slot| slot.state().is_settled()));
    }

    #[test]
    fn test_reconcile_method_matches_diff_list() {
        let mut list: KeyedList<Row, String> = KeyedList::new(config());
        list.reconcile(&[row("x")], &renderer());
        assert_eq!(list.keys(), vec!["x"]);
    }
}
