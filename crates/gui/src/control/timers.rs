//! Cancellable one-shot timers.
//!
//! Controls never sleep; they schedule a timer and the owner of the event loop polls
//! [`Timers::take_due`] and hands each due id back to the controls.

use std::time::{Duration, Instant};

/// Identity of one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub trait Timers {
    fn schedule(&mut self, delay: Duration) -> TimerId;
    /// Cancelling an unknown or already fired timer is a no-op
    fn cancel(&mut self, id: TimerId);
    fn pending(&self) -> usize;
    /// Remove and return every timer whose deadline has passed, earliest first
    fn take_due(&mut self) -> Vec<TimerId>;
}

fn drain_due<T: Ord + Copy>(pending: &mut Vec<(T, TimerId)>, now: T) -> Vec<TimerId> {
    let mut due: Vec<(T, TimerId)> = Vec::new();
    pending.retain(|entry| {
        if entry.0 <= now {
            due.push(*entry);
            false
        } else {
            true
        }
    });
    due.sort();
    due.into_iter().map(|(_, id)| id).collect()
}

/// Manually advanced clock for tests and scripted runs
#[derive(Debug, Default)]
pub struct VirtualTimers {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerId)>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Timers for VirtualTimers {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((self.now + delay, id));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(_, pending)| *pending != id);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn take_due(&mut self) -> Vec<TimerId> {
        drain_due(&mut self.pending, self.now)
    }
}

/// Wall-clock timers for the interactive viewer
#[derive(Debug, Default)]
pub struct ClockTimers {
    next_id: u64,
    pending: Vec<(Instant, TimerId)>,
}

impl ClockTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time until the earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = Instant::now();
        self.pending
            .iter()
            .map(|(at, _)| at.saturating_duration_since(now))
            .min()
    }
}

impl Timers for ClockTimers {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((Instant::now() + delay, id));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(_, pending)| *pending != id);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn take_due(&mut self) -> Vec<TimerId> {
        drain_due(&mut self.pending, Instant::now())
    }
}
