//! Per-session timer queue.
//!
//! Every session and boss encounter owns one `Scheduler` over its own
//! logical clock. Timers fire strictly in `(due, scheduled order)` order and
//! are handed back one at a time, so all state changes for a session go
//! through a single update path. Dropping the scheduler drops every pending
//! timer with it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Timer<E> {
    due: u64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Timer<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Timer<E> {}

impl<E> PartialOrd for Timer<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Timer<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of pending events keyed by due time in milliseconds.
pub struct Scheduler<E> {
    now: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Timer<E>>>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current logical time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `event` to fire `delay_ms` from now.
    pub fn schedule_in(&mut self, delay_ms: u64, event: E) {
        self.schedule_at(self.now + delay_ms, event);
    }

    /// Schedule `event` at an absolute time. Times in the past fire on the
    /// next advance.
    pub fn schedule_at(&mut self, due: u64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Timer {
            due: due.max(self.now),
            seq,
            event,
        }));
    }

    /// Drop every pending timer whose event matches.
    pub fn cancel(&mut self, mut predicate: impl FnMut(&E) -> bool) {
        self.queue.retain(|Reverse(timer)| !predicate(&timer.event));
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pop the next timer due at or before `until`, moving the clock to its
    /// due time.
    pub fn pop_due(&mut self, until: u64) -> Option<E> {
        let due = self.queue.peek().map(|Reverse(timer)| timer.due)?;
        if due > until {
            return None;
        }
        let Reverse(timer) = self.queue.pop()?;
        self.now = timer.due;
        Some(timer.event)
    }

    /// Move the clock forward to `until` once all due timers are drained.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
