//! The discrete-event queue: pending pin updates ordered either by plain
//! insertion order (FIFO) or by virtual time with stable tie-breaking
//! (sorted mode).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet, VecDeque};

use crate::types::PinIndex;

/// A pending pin re-evaluation. `external` marks writes staged by
/// [`crate::Pin::set_value`], which bypass gate evaluation and only
/// propagate downstream (see `Circuit::simulate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub pin: PinIndex,
    pub time: i64,
    pub external: bool,
    pub insert_index: u64,
}

/// Ordered so a `BinaryHeap<HeapEvent>` pops the earliest time first, ties
/// broken by the lower `insert_index` (FIFO among simultaneous events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEvent(Event);

impl Ord for HeapEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .time
            .cmp(&self.0.time)
            .then_with(|| other.0.insert_index.cmp(&self.0.insert_index))
    }
}

impl PartialOrd for HeapEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending-event store with two disciplines: FIFO (fast, correct when
/// delays are uniform or the topology already preserves causality) and
/// sorted (a min-heap keyed by `(time, insert_index)`, required when
/// heterogeneous delays must still dispatch in time order).
#[derive(Debug, Default)]
pub struct EventQueue {
    fifo: VecDeque<Event>,
    heap: BinaryHeap<HeapEvent>,
    update_set: Option<HashSet<PinIndex>>,
    next_insert_index: u64,
    pub sort_queue: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable deduplication: while a pin has a queued event, further `add`
    /// calls for that same pin are no-ops. Coalesces simultaneous
    /// re-enqueues of the same pin.
    pub fn set_dedup(&mut self, enabled: bool) {
        self.update_set = if enabled { Some(HashSet::new()) } else { None };
    }

    pub fn add(&mut self, pin: PinIndex, time: i64, external: bool) {
        if let Some(set) = &mut self.update_set {
            if !set.insert(pin) {
                return;
            }
        }
        let event = Event {
            pin,
            time,
            external,
            insert_index: self.next_insert_index,
        };
        self.next_insert_index += 1;
        if self.sort_queue {
            self.heap.push(HeapEvent(event));
        } else {
            self.fifo.push_back(event);
        }
    }

    pub fn peek(&self) -> Option<&Event> {
        if self.sort_queue {
            self.heap.peek().map(|e| &e.0)
        } else {
            self.fifo.front()
        }
    }

    pub fn pop(&mut self) -> Option<Event> {
        let event = if self.sort_queue {
            self.heap.pop().map(|e| e.0)
        } else {
            self.fifo.pop_front()
        };
        if let (Some(event), Some(set)) = (&event, &mut self.update_set) {
            set.remove(&event.pin);
        }
        event
    }

    pub fn is_empty(&self) -> bool {
        if self.sort_queue {
            self.heap.is_empty()
        } else {
            self.fifo.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_mode_preserves_insertion_order() {
        let mut q = EventQueue::new();
        q.add(1, 5, false);
        q.add(2, 0, false);
        q.add(3, 5, false);
        assert_eq!(q.pop().unwrap().pin, 1);
        assert_eq!(q.pop().unwrap().pin, 2);
        assert_eq!(q.pop().unwrap().pin, 3);
        assert!(q.pop().is_none());
    }

    #[test]
    fn sorted_mode_orders_by_time_then_insertion() {
        let mut q = EventQueue::new();
        q.sort_queue = true;
        q.add(1, 5, false);
        q.add(2, 0, false);
        q.add(3, 0, false);
        assert_eq!(q.pop().unwrap().pin, 2);
        assert_eq!(q.pop().unwrap().pin, 3);
        assert_eq!(q.pop().unwrap().pin, 1);
    }

    #[test]
    fn dedup_coalesces_same_pin() {
        let mut q = EventQueue::new();
        q.set_dedup(true);
        q.add(4, 0, false);
        q.add(4, 0, false);
        assert_eq!(q.pop().unwrap().pin, 4);
        assert!(q.pop().is_none());
        // after popping, the pin can be re-queued
        q.add(4, 1, false);
        assert_eq!(q.pop().unwrap().pin, 4);
    }
}
