//! Bounded zoom-navigation history.
//!
//! Two capacity-limited stacks of extents (previous/next) drive
//! zoom-to-previous and zoom-to-next. The clearing invariant lives in a
//! single code path: only [`ViewHistory::record_fresh`] clears the next
//! stack, while replay through [`ViewHistory::go_back`] and
//! [`ViewHistory::go_forward`] moves one entry between the stacks without
//! clearing either. This distinction prevents back-navigation's own
//! extent-changed notification from clobbering the redo branch.

use std::collections::VecDeque;

use cartoframe_core::Extent;

/// A bounded stack of extents backed by a ring deque.
///
/// Pushing beyond capacity evicts the oldest (bottom) entry, not the
/// newest.
#[derive(Debug, Clone)]
pub struct BoundedExtentStack {
    items: VecDeque<Extent>,
    capacity: usize,
}

impl BoundedExtentStack {
    /// Creates a stack holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an extent, evicting the oldest entry on overflow.
    pub fn push(&mut self, extent: Extent) {
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(extent);
    }

    /// Pops the most recent entry.
    pub fn pop(&mut self) -> Option<Extent> {
        self.items.pop_back()
    }

    /// The most recent entry without removing it.
    pub fn top(&self) -> Option<&Extent> {
        self.items.back()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Previous/next extent stacks with the cross-clearing rules applied.
#[derive(Debug, Clone)]
pub struct ViewHistory {
    previous: BoundedExtentStack,
    next: BoundedExtentStack,
}

impl ViewHistory {
    /// Creates a history with the given per-stack capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            previous: BoundedExtentStack::new(capacity),
            next: BoundedExtentStack::new(capacity),
        }
    }

    /// Records a fresh (non-replay) extent transition.
    ///
    /// Pushes `old` onto the previous stack and invalidates the redo
    /// branch. Duplicate notifications carrying the same extent, and
    /// rounding look-alikes of the previous stack's top, are dropped so
    /// the stacks never fill with near-identical entries.
    pub fn record_fresh(&mut self, old: &Extent, new: &Extent) {
        if old.approx_eq(new) {
            return;
        }
        if self.previous.top().is_some_and(|top| top.approx_eq(new)) {
            return;
        }
        self.previous.push(*old);
        self.next.clear();
    }

    /// Steps back one entry: pushes `current` onto the next stack and
    /// returns the extent to restore. No-op returning `None` when the
    /// previous stack is empty.
    pub fn go_back(&mut self, current: Extent) -> Option<Extent> {
        let restored = self.previous.pop()?;
        self.next.push(current);
        Some(restored)
    }

    /// Steps forward one entry: pushes `current` onto the previous stack
    /// and returns the extent to restore. No-op returning `None` when the
    /// next stack is empty.
    pub fn go_forward(&mut self, current: Extent) -> Option<Extent> {
        let restored = self.next.pop()?;
        self.previous.push(current);
        Some(restored)
    }

    /// True when zoom-to-previous has somewhere to go.
    pub fn can_go_back(&self) -> bool {
        !self.previous.is_empty()
    }

    /// True when zoom-to-next has somewhere to go.
    pub fn can_go_forward(&self) -> bool {
        !self.next.is_empty()
    }

    /// Entries currently held in the previous stack.
    pub fn previous_len(&self) -> usize {
        self.previous.len()
    }

    /// Drops all history.
    pub fn clear(&mut self) {
        self.previous.clear();
        self.next.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(i: f64) -> Extent {
        Extent::new(0.0, 0.0, 100.0 + i, 100.0 + i)
    }

    #[test]
    fn test_bounded_push_evicts_oldest() {
        let mut stack = BoundedExtentStack::new(3);
        for i in 0..5 {
            stack.push(extent(i as f64));
        }
        assert_eq!(stack.len(), 3);
        // Oldest two (0, 1) were evicted from the bottom.
        assert_eq!(stack.pop(), Some(extent(4.0)));
        assert_eq!(stack.pop(), Some(extent(3.0)));
        assert_eq!(stack.pop(), Some(extent(2.0)));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_record_fresh_pushes_and_clears_next() {
        let mut history = ViewHistory::new(10);
        history.record_fresh(&extent(0.0), &extent(1.0));
        history.record_fresh(&extent(1.0), &extent(2.0));
        assert!(history.can_go_back());
        assert!(!history.can_go_forward());

        // Go back once: redo branch appears.
        let restored = history.go_back(extent(2.0)).expect("previous entry");
        assert_eq!(restored, extent(1.0));
        assert!(history.can_go_forward());

        // A fresh navigation invalidates the redo branch.
        history.record_fresh(&extent(1.0), &extent(7.0));
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_replay_does_not_clear() {
        let mut history = ViewHistory::new(10);
        history.record_fresh(&extent(0.0), &extent(1.0));
        history.record_fresh(&extent(1.0), &extent(2.0));

        let a = history.go_back(extent(2.0)).expect("back");
        assert_eq!(a, extent(1.0));
        let b = history.go_back(extent(1.0)).expect("back again");
        assert_eq!(b, extent(0.0));
        // Both entries are on the next stack now.
        assert!(history.can_go_forward());

        let fwd = history.go_forward(extent(0.0)).expect("forward");
        assert_eq!(fwd, extent(1.0));
        assert!(history.can_go_forward());
        assert!(history.can_go_back());
    }

    #[test]
    fn test_duplicate_notifications_not_pushed() {
        let mut history = ViewHistory::new(10);
        history.record_fresh(&extent(0.0), &extent(1.0));
        // Same transition reported twice (e.g. echoed change notification).
        history.record_fresh(&extent(1.0), &extent(1.0));
        assert_eq!(history.previous_len(), 1);
    }

    #[test]
    fn test_rounding_lookalike_not_pushed() {
        let mut history = ViewHistory::new(10);
        let a = Extent::new(0.0, 0.0, 100.0, 100.0);
        let b = Extent::new(0.0, 0.0, 200.0, 200.0);
        history.record_fresh(&a, &b);
        // The engine notifies again with a rounding-perturbed copy of the
        // extent already on top of the previous stack.
        let a_rounded = Extent::new(1e-10, 0.0, 100.0, 100.0 - 1e-10);
        history.record_fresh(&b, &a_rounded);
        assert_eq!(history.previous_len(), 1);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = ViewHistory::new(4);
        assert_eq!(history.go_back(extent(0.0)), None);
        assert_eq!(history.go_forward(extent(0.0)), None);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
        // The failed replay must not have pushed anything.
        assert!(!history.can_go_forward());
        assert_eq!(history.previous_len(), 0);
    }

    #[test]
    fn test_capacity_bounds_previous_stack() {
        let mut history = ViewHistory::new(5);
        for i in 0..20 {
            history.record_fresh(&extent(i as f64), &extent((i + 1) as f64));
        }
        assert_eq!(history.previous_len(), 5);
        // The five most recent entries survive, oldest first evicted.
        let e = history.go_back(extent(20.0)).expect("back");
        assert_eq!(e, extent(19.0));
    }
}
