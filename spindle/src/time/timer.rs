use crate::sync::Future;

use std::cmp::Ordering;
use std::time::Instant;

/// An entry in the loop's timer heap.
///
/// `TimerEvent` associates a deadline with the [`Future`] to set once the
/// deadline has passed. Entries are stored in a `BinaryHeap` and popped
/// earliest-deadline first; equal deadlines pop in insertion order.
pub(crate) struct TimerEvent {
    /// The time at which the future should be set.
    pub(crate) deadline: Instant,

    /// Insertion rank, used to break ties between equal deadlines.
    pub(crate) sequence: u64,

    /// Future to set when the deadline is reached.
    pub(crate) future: Future,
}

impl TimerEvent {
    /// Sets the associated future, re-queueing any task parked on it.
    pub(crate) fn fire(self) {
        self.future.set();
    }
}

impl Eq for TimerEvent {}

impl PartialEq for TimerEvent {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.sequence == other.sequence
    }
}

impl Ord for TimerEvent {
    /// Orders timer events by deadline, then by insertion rank.
    ///
    /// Note that the comparison is **reversed** so that a
    /// `BinaryHeap<TimerEvent>` behaves as a min-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for TimerEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BinaryHeap;
    use std::time::Duration;

    fn event(deadline: Instant, sequence: u64) -> TimerEvent {
        TimerEvent {
            deadline,
            sequence,
            future: Future::new(),
        }
    }

    #[test]
    fn heap_pops_earliest_deadline_then_insertion_order() {
        let base = Instant::now();
        let mut heap = BinaryHeap::new();

        heap.push(event(base + Duration::from_millis(3), 0));
        heap.push(event(base + Duration::from_millis(1), 1));
        heap.push(event(base + Duration::from_millis(1), 2));
        heap.push(event(base + Duration::from_millis(2), 3));

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.sequence)).collect();

        assert_eq!(order, vec![1, 2, 3, 0]);
    }
}
