//! Presentation events and the deferred effect
//!
//! A resolved attack or heal is published as a [`BattleEvent`] and its state
//! change parked in a [`DeferredEffect`] until someone commits it.

use crate::core::{Roster, Side};
use serde::{Deserialize, Serialize};

/// What a presentation layer needs to animate one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationEvent {
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
}

/// A presentation event tagged with a monotonically increasing sequence
/// number, shared across event kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub seq: u64,
    pub event: PresentationEvent,
}

/// A computed action result that has not been applied to the field yet
#[derive(Debug, Clone)]
pub enum DeferredEffect {
    Attack {
        side: Side,
        attackers: Roster,
        defenders: Roster,
        seq: u64,
    },
    Heal {
        side: Side,
        roster: Roster,
        seq: u64,
    },
}

impl DeferredEffect {
    /// Sequence number of the event this effect belongs to
    pub fn seq(&self) -> u64 {
        match self {
            DeferredEffect::Attack { seq, .. } | DeferredEffect::Heal { seq, .. } => *seq,
        }
    }
}

/// Which commit path applied an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPath {
    /// Presentation-timed, at the visual impact point
    Timed,
    /// Fast-forward / skip, no presentation delay
    Instant,
}
