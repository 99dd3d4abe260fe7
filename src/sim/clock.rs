//! Virtual-time timer queue
//!
//! Every delayed action in a round goes through one of these. Time only
//! moves when the host calls [`TimerQueue::pop_due`] / [`TimerQueue::advance_to`],
//! which keeps the scheduler deterministic and lets tests fast-forward.

use std::collections::{BTreeMap, HashMap};

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Pending timers ordered by (due time, scheduling order)
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<(u64, TimerId), T>,
    /// id -> due time, for O(log n) cancellation
    due_index: HashMap<TimerId, u64>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            timers: BTreeMap::new(),
            due_index: HashMap::new(),
        }
    }

    /// Current virtual time (ms)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of outstanding timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Schedule `payload` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.timers.insert((due, id), payload);
        self.due_index.insert(id, due);
        id
    }

    /// Cancel a single timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_index.remove(&id) {
            Some(due) => self.timers.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Drop every outstanding timer, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.timers.len();
        self.timers.clear();
        self.due_index.clear();
        dropped
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.timers.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until_ms`.
    ///
    /// The clock jumps to that timer's due time, so anything the payload
    /// schedules is relative to when it fired.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let (&(due, id), _) = self.timers.first_key_value()?;
        if due > until_ms {
            return None;
        }
        let payload = self.timers.remove(&(due, id))?;
        self.due_index.remove(&id);
        self.now_ms = self.now_ms.max(due);
        Some((id, payload))
    }

    /// Move the clock forward. Never moves backwards.
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
