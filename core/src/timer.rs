//! Cancellable timers driven by an external clock.
//!
//! Timers never fire on their own: the owner polls the queue with the
//! current time and receives the ids that came due. Cancelling removes the
//! timer outright, so a cancelled id can never be returned by a later poll.

use crate::types::Millis;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct Timer {
    due_at: Millis,
    /// Some(period) for repeating timers.
    period: Option<Millis>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers:  BTreeMap<TimerId, Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a single-shot timer.
    pub fn arm_once(&mut self, due_at: Millis) -> TimerId {
        self.insert(Timer { due_at, period: None })
    }

    /// Arm a repeating timer. Periods below 1 ms are raised to 1 ms.
    pub fn arm_every(&mut self, first_due_at: Millis, period: Millis) -> TimerId {
        self.insert(Timer {
            due_at: first_due_at,
            period: Some(period.max(1)),
        })
    }

    fn insert(&mut self, timer: Timer) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, timer);
        id
    }

    /// Returns false if the timer had already fired (single-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.timers.values().map(|t| t.due_at).min()
    }

    /// Every timer due at or before `now`, earliest first.
    ///
    /// Single-shot timers are removed. A repeating timer fires once per poll
    /// however many periods were missed, then moves to its next slot after
    /// `now`.
    pub fn poll_due(&mut self, now: Millis) -> Vec<TimerId> {
        let mut due: Vec<(Millis, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_at <= now)
            .map(|(id, t)| (t.due_at, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            let Some(timer) = self.timers.get_mut(id) else {
                continue;
            };
            match timer.period {
                Some(period) => {
                    let missed = now.saturating_sub(timer.due_at) / period + 1;
                    timer.due_at = timer.due_at.saturating_add(missed.saturating_mul(period));
                }
                None => {
                    self.timers.remove(id);
                }
            }
        }

        due.into_iter().map(|(_, id)| id).collect()
    }
}
