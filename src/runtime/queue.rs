//! Timer-ordered ready queue.
//!
//! Holds every task that is waiting to be resumed, keyed by wake time. Tasks
//! that are due at the same instant come out in insertion order, which keeps
//! scheduling deterministic.

use crate::task::Runnable;

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Instant;

struct Entry {
    wake_at: Instant,
    seq: u64,
    task: Rc<dyn Runnable>,
}

impl Entry {
    fn key(&self) -> (Instant, u64) {
        (self.wake_at, self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-heap of tasks ordered by `(wake_at, insertion order)`.
pub(crate) struct ReadyQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl ReadyQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Enqueues a task to be resumed no earlier than `wake_at`.
    pub(crate) fn push(&mut self, wake_at: Instant, task: Rc<dyn Runnable>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.heap.push(Reverse(Entry { wake_at, seq, task }));
    }

    /// Dequeues the earliest-due task together with its wake time.
    pub(crate) fn pop(&mut self) -> Option<(Instant, Rc<dyn Runnable>)> {
        self.heap
            .pop()
            .map(|Reverse(entry)| (entry.wake_at, entry.task))
    }

    /// Removes every queued task, in no particular order.
    pub(crate) fn drain(&mut self) -> Vec<Rc<dyn Runnable>> {
        self.heap
            .drain()
            .map(|Reverse(entry)| entry.task)
            .collect()
    }
}
