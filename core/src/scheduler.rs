//! Virtual timer queue.
//!
//! Timers fire in (fire_at, registration order). A repeating timer keeps
//! its registration slot when re-armed, so two timers due at the same
//! instant always fire in the order they were first registered.

use crate::{sequence::SequenceAction, types::Millis};
use std::{cmp::Ordering, collections::BinaryHeap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    ClockRefresh,
    SimulatorTick,
    AnalyticsRefresh,
    Sequence(SequenceAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Timer {
    fire_at: Millis,
    seq:     u64,
    every:   Option<Millis>,
    kind:    TimerKind,
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest timer pops first.
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue:    BinaryHeap<Timer>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `kind` at `first_at` and every `interval` after that.
    pub fn every(&mut self, first_at: Millis, interval: Millis, kind: TimerKind) {
        self.push(first_at, Some(interval.max(1)), kind);
    }

    pub fn once(&mut self, at: Millis, kind: TimerKind) {
        self.push(at, None, kind);
    }

    /// Pop the next timer due at or before `until`, re-arming it if it
    /// repeats.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, TimerKind)> {
        if self.queue.peek()?.fire_at > until {
            return None;
        }
        let timer = self.queue.pop()?;
        let fired = (timer.fire_at, timer.kind);
        if let Some(interval) = timer.every {
            self.queue.push(Timer { fire_at: timer.fire_at.saturating_add(interval), ..timer });
        }
        Some(fired)
    }

    /// Drop every pending timer matching `pred`. Returns how many went.
    pub fn cancel<F: Fn(&TimerKind) -> bool>(&mut self, pred: F) -> usize {
        let before = self.queue.len();
        self.queue.retain(|t| !pred(&t.kind));
        before - self.queue.len()
    }

    pub fn pending<F: Fn(&TimerKind) -> bool>(&self, pred: F) -> usize {
        self.queue.iter().filter(|t| pred(&t.kind)).count()
    }

    pub fn next_fire_at(&self) -> Option<Millis> {
        self.queue.peek().map(|t| t.fire_at)
    }

    fn push(&mut self, fire_at: Millis, every: Option<Millis>, kind: TimerKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Timer { fire_at, seq, every, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Checkpoint;

    fn drain(s: &mut Scheduler, until: Millis) -> Vec<(Millis, TimerKind)> {
        std::iter::from_fn(|| s.pop_due(until)).collect()
    }

    #[test]
    fn repeating_timers_fire_in_registration_order() {
        let mut s = Scheduler::new();
        s.every(1_000, 1_000, TimerKind::ClockRefresh);
        s.every(2_000, 2_000, TimerKind::SimulatorTick);

        let fired = drain(&mut s, 4_000);
        assert_eq!(
            fired,
            vec![
                (1_000, TimerKind::ClockRefresh),
                (2_000, TimerKind::ClockRefresh),
                (2_000, TimerKind::SimulatorTick),
                (3_000, TimerKind::ClockRefresh),
                (4_000, TimerKind::ClockRefresh),
                (4_000, TimerKind::SimulatorTick),
            ]
        );
        assert_eq!(s.next_fire_at(), Some(5_000));
    }

    #[test]
    fn rearming_near_the_end_of_time_saturates() {
        let mut s = Scheduler::new();
        s.every(Millis::MAX - 10, 1_000, TimerKind::ClockRefresh);

        assert_eq!(s.pop_due(Millis::MAX - 10), Some((Millis::MAX - 10, TimerKind::ClockRefresh)));
        assert_eq!(s.next_fire_at(), Some(Millis::MAX));
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut s = Scheduler::new();
        s.once(500, TimerKind::AnalyticsRefresh);
        assert!(s.pop_due(499).is_none());
        assert_eq!(s.pop_due(500), Some((500, TimerKind::AnalyticsRefresh)));
        assert!(s.pop_due(10_000).is_none());
    }

    #[test]
    fn cancel_removes_only_matching() {
        let mut s = Scheduler::new();
        s.every(1_000, 1_000, TimerKind::ClockRefresh);
        s.once(1_500, TimerKind::Sequence(SequenceAction::OfficerAlert(Checkpoint::A)));
        s.once(2_500, TimerKind::Sequence(SequenceAction::PreemptSignal(Checkpoint::A)));

        let is_seq = |k: &TimerKind| matches!(k, TimerKind::Sequence(_));
        assert_eq!(s.pending(is_seq), 2);
        assert_eq!(s.cancel(is_seq), 2);
        assert_eq!(s.pending(is_seq), 0);
        assert_eq!(drain(&mut s, 3_000).len(), 3);
    }
}
