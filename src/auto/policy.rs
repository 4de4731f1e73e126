//! Action policies for autonomous play
//!
//! A policy looks at the field and picks one action for the current actor.
//! It never touches the field itself; the turn driver submits the choice to the
//! controller, which is the only writer.

use crate::core::{Ability, ActorRef, MatchField, Role};
use crate::game::ForfeitReason;
use crate::rules::{offensive_targets, pick_heal_target};

/// One action a policy wants the current actor to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Attack { slot: usize, target: usize },
    Heal { slot: usize, target: usize },
    Resurrect { slot: usize },
    Forfeit { slot: usize, reason: ForfeitReason },
}

impl PlannedAction {
    /// Slot of the acting combatant
    pub fn slot(&self) -> usize {
        match *self {
            PlannedAction::Attack { slot, .. }
            | PlannedAction::Heal { slot, .. }
            | PlannedAction::Resurrect { slot }
            | PlannedAction::Forfeit { slot, .. } => slot,
        }
    }
}

/// Chooses actions for whoever is at the front of the queue
pub trait ActionPolicy {
    /// Pick an action for `actor`
    ///
    /// The returned action may still be rejected by the controller; the turn
    /// driver forfeits the turn in that case.
    fn choose_action(&mut self, actor: ActorRef, field: &MatchField) -> PlannedAction;
}

/// Simple deterministic policy
///
/// Healer-role combatants heal the most wounded ally, or forfeit when nobody
/// is hurt. Everyone else (a MinorHeal holder of another role included) hits
/// the lowest-index legal target, or forfeits.
///
/// No search and no lookahead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl DefaultPolicy {
    pub fn new() -> Self {
        DefaultPolicy
    }
}

impl ActionPolicy for DefaultPolicy {
    fn choose_action(&mut self, actor: ActorRef, field: &MatchField) -> PlannedAction {
        let slot = actor.slot;
        let Some(combatant) = field.combatant(actor) else {
            return PlannedAction::Forfeit {
                slot,
                reason: ForfeitReason::NoLegalTarget,
            };
        };

        if combatant.role == Role::Healer {
            return match pick_heal_target(actor, field) {
                Some(target) => PlannedAction::Heal { slot, target },
                None => PlannedAction::Forfeit {
                    slot,
                    reason: ForfeitReason::NoHealTarget,
                },
            };
        }

        match offensive_targets(combatant, actor, field).iter().min() {
            Some(&target) => PlannedAction::Attack { slot, target },
            None => PlannedAction::Forfeit {
                slot,
                reason: ForfeitReason::NoLegalTarget,
            },
        }
    }
}

/// Opt-in policy that spends resurrect-holders' turns on raising or summoning
///
/// Falls back to the wrapped policy for everyone else, and for a
/// resurrect-holder whose roster has no fallen combatant and no empty slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummonerPolicy<P = DefaultPolicy> {
    inner: P,
}

impl<P: ActionPolicy> SummonerPolicy<P> {
    pub fn new(inner: P) -> Self {
        SummonerPolicy { inner }
    }
}

impl<P: ActionPolicy> ActionPolicy for SummonerPolicy<P> {
    fn choose_action(&mut self, actor: ActorRef, field: &MatchField) -> PlannedAction {
        if let Some(combatant) = field.combatant(actor) {
            let own = field.roster(actor.side);
            if combatant.has(Ability::Resurrect) && (own.first_fallen().is_some() || own.last_empty().is_some()) {
                return PlannedAction::Resurrect { slot: actor.slot };
            }
        }
        self.inner.choose_action(actor, field)
    }
}
