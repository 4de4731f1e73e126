//! Append-only step log for instant replay
//!
//! Every executed action (and every round boundary) is recorded together with
//! a snapshot of the field. Replay navigation moves a cursor over the records
//! and hands back the stored snapshot. Applying a recorded step back onto a
//! live match is not supported.

use crate::core::{ActorRef, MatchField, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    RoundStart {
        round: u32,
    },
    Attack {
        side: Side,
        attacker: usize,
        target: usize,
        damage: i32,
        did_kill: bool,
    },
    Heal {
        side: Side,
        healer: usize,
        target: usize,
        amount: i32,
    },
    Resurrect {
        side: Side,
        caster: usize,
        target: usize,
    },
    Forfeit {
        side: Side,
        slot: usize,
    },
    RoundEnd {
        round: u32,
    },
}

/// Field and turn state at the moment a step was recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub field: MatchField,
    pub acting: Option<ActorRef>,
    pub queue_cursor: usize,
    pub log_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub round: u32,
    pub action: StepAction,
    pub snapshot: FieldSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepLog {
    records: Vec<StepRecord>,

    /// Recording can be switched off for bulk simulation
    enabled: bool,

    replay_mode: bool,
    replay_cursor: usize,
}

impl StepLog {
    pub fn new() -> Self {
        StepLog {
            records: Vec::new(),
            enabled: true,
            replay_mode: false,
            replay_cursor: 0,
        }
    }

    /// Create a log that records nothing (for benchmarking)
    pub fn disabled() -> Self {
        StepLog {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, round: u32, action: StepAction, snapshot: FieldSnapshot) {
        if self.enabled {
            let index = self.records.len();
            self.records.push(StepRecord {
                index,
                round,
                action,
                snapshot,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.replay_mode = false;
        self.replay_cursor = 0;
    }

    pub fn start_replay(&mut self) {
        self.replay_mode = true;
        self.replay_cursor = 0;
    }

    pub fn stop_replay(&mut self) {
        self.replay_mode = false;
    }

    pub fn is_replay_mode(&self) -> bool {
        self.replay_mode
    }

    pub fn replay_cursor(&self) -> usize {
        self.replay_cursor
    }

    /// Move the replay cursor to `index`
    pub fn go_to(&mut self, index: usize) -> Option<&StepRecord> {
        if index >= self.records.len() {
            return None;
        }
        self.replay_cursor = index;
        self.records.get(index)
    }

    pub fn go_to_beginning(&mut self) -> Option<&StepRecord> {
        self.go_to(0)
    }

    pub fn go_to_end(&mut self) -> Option<&StepRecord> {
        let last = self.records.len().checked_sub(1)?;
        self.go_to(last)
    }

    /// Advance the replay cursor by one (only in replay mode)
    pub fn replay_forward(&mut self) -> Option<&StepRecord> {
        if !self.replay_mode {
            return None;
        }
        self.go_to(self.replay_cursor + 1)
    }
}

impl Default for StepLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> FieldSnapshot {
        FieldSnapshot {
            field: MatchField::default(),
            acting: None,
            queue_cursor: 0,
            log_len: 0,
        }
    }

    #[test]
    fn test_step_log_append() {
        let mut log = StepLog::new();
        assert!(log.is_empty());

        log.record(1, StepAction::RoundStart { round: 1 }, snapshot());
        log.record(
            1,
            StepAction::Forfeit {
                side: Side::Player,
                slot: 2,
            },
            snapshot(),
        );

        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1].index, 1);
        assert!(matches!(log.last().unwrap().action, StepAction::Forfeit { slot: 2, .. }));
    }

    #[test]
    fn test_disabled_log() {
        let mut log = StepLog::disabled();
        log.record(1, StepAction::RoundStart { round: 1 }, snapshot());
        assert_eq!(log.len(), 0); // Nothing logged when disabled
    }

    #[test]
    fn test_replay_navigation() {
        let mut log = StepLog::new();
        for round in 1..=3 {
            log.record(round, StepAction::RoundStart { round }, snapshot());
        }

        // Forward stepping only works in replay mode
        assert!(log.replay_forward().is_none());

        log.start_replay();
        assert_eq!(log.replay_forward().unwrap().round, 2);
        assert_eq!(log.go_to_end().unwrap().round, 3);
        assert!(log.replay_forward().is_none());
        assert_eq!(log.replay_cursor(), 2);
        assert_eq!(log.go_to_beginning().unwrap().round, 1);
        assert!(log.go_to(9).is_none());

        log.clear();
        assert!(!log.is_replay_mode());
        assert!(log.go_to_end().is_none());
    }
}
