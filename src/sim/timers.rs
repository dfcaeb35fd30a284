//! Deferred actions against the game clock
//!
//! Not OS timers: the clock only moves when `tick` supplies a new time, and
//! due actions run synchronously inside that tick.

use super::state::Side;

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Round countdown finished
    StartRound,
    /// Score feedback finished for the player who lost the point
    FinishScore { loser: Side },
}

#[derive(Debug, Clone)]
struct Scheduled {
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    due_ms: f64,
    action: TimerAction,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once the clock reaches `now_ms + delay_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            seq,
            due_ms: now_ms + delay_ms.max(0.0),
            action,
        });
    }

    /// Cancel every pending timer whose action matches; returns how many
    pub fn cancel_matching(&mut self, action: TimerAction) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.action != action);
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Milliseconds until the earliest pending `action`, if any
    pub fn remaining_ms(&self, now_ms: f64, action: TimerAction) -> Option<f64> {
        self.pending
            .iter()
            .filter(|s| s.action == action)
            .map(|s| (s.due_ms - now_ms).max(0.0))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Remove and return every action due at `now_ms`, earliest first
    /// (ties in scheduling order)
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerAction> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= now_ms {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut timers = Scheduler::new();
        timers.schedule(0.0, 3000.0, TimerAction::StartRound);

        assert!(timers.take_due(2999.0).is_empty());
        assert_eq!(timers.take_due(3000.0), vec![TimerAction::StartRound]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut timers = Scheduler::new();
        let finish = TimerAction::FinishScore { loser: Side::Left };
        timers.schedule(0.0, 500.0, TimerAction::StartRound);
        timers.schedule(0.0, 100.0, finish);
        timers.schedule(0.0, 500.0, finish);

        assert_eq!(
            timers.take_due(1000.0),
            vec![finish, TimerAction::StartRound, finish]
        );
    }

    #[test]
    fn test_cancel_matching() {
        let mut timers = Scheduler::new();
        let finish = TimerAction::FinishScore { loser: Side::Left };
        timers.schedule(0.0, 10.0, TimerAction::StartRound);
        timers.schedule(0.0, 20.0, TimerAction::StartRound);
        timers.schedule(0.0, 30.0, finish);
        assert_eq!(timers.cancel_matching(TimerAction::StartRound), 2);
        assert_eq!(timers.cancel_matching(TimerAction::StartRound), 0);
        assert_eq!(timers.take_due(100.0), vec![finish]);
    }

    #[test]
    fn test_remaining() {
        let mut timers = Scheduler::new();
        timers.schedule(1000.0, 3000.0, TimerAction::StartRound);
        assert_eq!(timers.remaining_ms(2500.0, TimerAction::StartRound), Some(1500.0));
        assert_eq!(
            timers.remaining_ms(2500.0, TimerAction::FinishScore { loser: Side::Right }),
            None
        );
    }
}
