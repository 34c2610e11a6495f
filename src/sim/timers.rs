//! Deferred action queue for drivers without a browser timer
//!
//! Actions are never cancelled here; `fire` drops the stale ones.

use super::input::{Deferred, DeferredAction};

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_ms: u64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    action: DeferredAction,
}

/// Pending deferred actions ordered by due time
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `deferred` to come due `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, deferred: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: now_ms + u64::from(deferred.delay_ms),
            seq,
            action: deferred.action,
        });
    }

    /// Remove and return every action due at or before `now_ms`, earliest first
    pub fn pop_due(&mut self, now_ms: u64) -> Vec<DeferredAction> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= now_ms {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due_ms, s.seq));
        due.into_iter().map(|s| s.action).collect()
    }

    /// Due time of the earliest pending action
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
