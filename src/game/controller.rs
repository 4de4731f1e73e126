//! Match controller
//!
//! Owns the field, the per-round action queue and the single deferred-effect
//! slot. Rounds run RoundStart -> ActorTurn (repeated) -> RoundEnd until one
//! or both rosters are defeated.
//!
//! Attacks and heals do not touch the field when they resolve. They publish a
//! [`BattleEvent`] and park the result as a [`DeferredEffect`]; the field
//! changes when the effect is committed, either at a presentation-chosen
//! impact moment ([`MatchController::commit_effect`]) or immediately
//! ([`MatchController::commit_effect_instant`]). While an effect is
//! outstanding no other action is accepted.

/// Verbose-only log line; compiled out without the `verbose-logging` feature
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self; // Suppress unused variable warning
        }
    };
}

use crate::core::{ActorRef, IdAllocator, MatchField, Roster, Side, SlotList};
use crate::game::{
    ActionQueue, BattleEvent, BattleLogger, CommitPath, DeferredEffect, FieldSnapshot, MatchObserver,
    PresentationEvent, StepAction, StepLog, VerbosityLevel,
};
use crate::rules::{combat, initiative, targeting, CombatEventKind};
use serde::{Deserialize, Serialize};

/// Rounds played before an unresolved match is called a draw
pub const DEFAULT_MAX_ROUNDS: u32 = 200;

/// Where the state machine currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// No teams submitted yet
    Setup,
    RoundStart,
    ActorTurn,
    RoundEnd,
    MatchOver,
}

/// Outcome from side A's (the player's) point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

/// Why the match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// One or both rosters have no living combatant
    Defeat,
    /// The round cap was reached
    RoundLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub rounds_played: u32,
    pub end_reason: EndReason,
}

/// Why an actor gave up its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForfeitReason {
    NoHealTarget,
    NoLegalTarget,
}

pub struct MatchController {
    field: MatchField,
    queue: ActionQueue,
    pending: Option<DeferredEffect>,
    seed: Option<u64>,
    phase: MatchPhase,
    round: u32,
    max_rounds: u32,
    event_seq: u64,
    last_event: Option<BattleEvent>,
    result: Option<MatchResult>,
    steps: StepLog,

    /// Published match log (Minimal and Normal lines)
    log: Vec<String>,
    pub logger: BattleLogger,

    /// IDs for units summoned mid-match
    summon_ids: IdAllocator,
    observers: Vec<Box<dyn MatchObserver + Send>>,
}

impl MatchController {
    pub fn new() -> Self {
        MatchController {
            field: MatchField::default(),
            queue: ActionQueue::new(),
            pending: None,
            seed: None,
            phase: MatchPhase::Setup,
            round: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            event_seq: 0,
            last_event: None,
            result: None,
            steps: StepLog::new(),
            log: Vec::new(),
            logger: BattleLogger::new(),
            summon_ids: IdAllocator::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    pub fn with_step_log(mut self, steps: StepLog) -> Self {
        self.steps = steps;
        self
    }

    /// Seed used for initiative tie-breaks from the next round on
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn add_observer(&mut self, observer: Box<dyn MatchObserver + Send>) {
        self.observers.push(observer);
    }

    pub fn field(&self) -> &MatchField {
        &self.field
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn has_pending_effect(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_effect(&self) -> Option<&DeferredEffect> {
        self.pending.as_ref()
    }

    pub fn last_event(&self) -> Option<&BattleEvent> {
        self.last_event.as_ref()
    }

    /// Sequence number of the most recent event (0 before the first)
    pub fn event_seq(&self) -> u64 {
        self.event_seq
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn steps(&self) -> &StepLog {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut StepLog {
        &mut self.steps
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    /// The actor whose turn it is, if the match is waiting for an action
    pub fn current_actor(&self) -> Option<ActorRef> {
        if self.phase != MatchPhase::ActorTurn {
            return None;
        }
        self.queue.locate_current(&self.field)
    }

    /// Legal offensive targets for the current actor if it stands at `slot`
    pub fn valid_targets_for(&self, slot: usize) -> SlotList {
        match self.current_actor() {
            Some(actor) if actor.slot == slot => match self.field.combatant(actor) {
                Some(c) => targeting::offensive_targets(c, actor, &self.field),
                None => SlotList::new(),
            },
            _ => SlotList::new(),
        }
    }

    /// Start a new match with these rosters
    ///
    /// Clears any previous match state and runs the first RoundStart.
    pub fn submit_teams(&mut self, player: Roster, enemy: Roster) {
        self.clear_match_state();

        let highest_id = player
            .occupied()
            .chain(enemy.occupied())
            .map(|(_, c)| c.id.as_u64())
            .max()
            .unwrap_or(0);
        self.summon_ids = IdAllocator::starting_at(highest_id + 1);
        self.field = MatchField::new(player, enemy);

        self.begin_round();
        self.settle();
        self.notify_state_changed();
    }

    /// Clear the field, the log and the queue
    pub fn hard_reset(&mut self) {
        self.clear_match_state();
        self.field = MatchField::default();
        self.logger.clear_logs();
        self.notify_state_changed();
    }

    fn clear_match_state(&mut self) {
        self.queue.clear();
        self.pending = None;
        self.phase = MatchPhase::Setup;
        self.round = 0;
        self.result = None;
        self.last_event = None;
        self.log.clear();
        self.steps.clear();
    }

    /// The current actor, if it stands at `slot` and nothing is outstanding
    fn acting(&self, slot: usize) -> Option<ActorRef> {
        if self.pending.is_some() {
            log_if_verbose!(self, "Action rejected: an effect is still outstanding.");
            return None;
        }
        self.current_actor().filter(|actor| actor.slot == slot)
    }

    /// Attack `target` on the opposing roster with the actor at `attacker_slot`
    ///
    /// On success the result is held as a deferred effect and an event is
    /// published. Returns false with no state change if `attacker_slot` is not
    /// the current actor, an effect is outstanding, the target is not legal, or
    /// the resolver refuses.
    pub fn attack(&mut self, attacker_slot: usize, target: usize) -> bool {
        let Some(actor) = self.acting(attacker_slot) else {
            return false;
        };
        let Some(striker) = self.field.combatant(actor) else {
            return false;
        };
        if !targeting::offensive_targets(striker, actor, &self.field).contains(&target) {
            return false;
        }

        let side = actor.side;
        let Some(resolved) = combat::resolve_attack(
            self.field.roster(side),
            self.field.roster(side.opponent()),
            side,
            actor.slot,
            target,
        ) else {
            return false;
        };
        let CombatEventKind::Hit { damage } = resolved.event.kind else {
            return false;
        };
        let did_kill = resolved.defenders.get(target).is_some_and(|c| !c.is_alive());

        let seq = self.next_seq();
        self.record_step(StepAction::Attack {
            side,
            attacker: actor.slot,
            target,
            damage,
            did_kill,
        });
        self.log_line(VerbosityLevel::Normal, resolved.description);
        self.pending = Some(DeferredEffect::Attack {
            side,
            attackers: resolved.attackers,
            defenders: resolved.defenders,
            seq,
        });
        self.publish(BattleEvent {
            seq,
            event: PresentationEvent::Attack {
                side,
                attacker: actor.slot,
                target,
                damage,
                did_kill,
            },
        });
        true
    }

    /// Heal the ally at `target` with the actor at `healer_slot`
    ///
    /// Same contract as [`attack`](Self::attack); the target must be a living,
    /// wounded ally.
    pub fn heal(&mut self, healer_slot: usize, target: usize) -> bool {
        let Some(actor) = self.acting(healer_slot) else {
            return false;
        };
        if !targeting::heal_targets(actor, &self.field).contains(&target) {
            return false;
        }

        let side = actor.side;
        let Some(resolved) = combat::resolve_heal(self.field.roster(side), side, actor.slot, target) else {
            return false;
        };
        let CombatEventKind::Heal { amount } = resolved.event.kind else {
            return false;
        };

        let seq = self.next_seq();
        self.record_step(StepAction::Heal {
            side,
            healer: actor.slot,
            target,
            amount,
        });
        self.log_line(VerbosityLevel::Normal, resolved.description);
        self.pending = Some(DeferredEffect::Heal {
            side,
            roster: resolved.roster,
            seq,
        });
        self.publish(BattleEvent {
            seq,
            event: PresentationEvent::Heal {
                side,
                healer: actor.slot,
                target,
                amount,
            },
        });
        true
    }

    /// Resurrect or summon with the actor at `caster_slot`
    ///
    /// Applied immediately (there is nothing to animate), after which the
    /// queue moves on.
    pub fn resurrect(&mut self, caster_slot: usize) -> bool {
        let Some(actor) = self.acting(caster_slot) else {
            return false;
        };
        let summon_id = self.summon_ids.peek();
        let Some(resolved) = combat::resolve_resurrect(self.field.roster(actor.side), actor.side, actor.slot, summon_id)
        else {
            return false;
        };
        if matches!(resolved.event.kind, CombatEventKind::Summon { .. }) {
            self.summon_ids.next_id();
        }

        *self.field.roster_mut(actor.side) = resolved.roster;
        self.log_line(VerbosityLevel::Normal, resolved.description);
        self.record_step(StepAction::Resurrect {
            side: actor.side,
            caster: actor.slot,
            target: resolved.event.target,
        });

        self.queue.advance();
        self.settle();
        self.notify_state_changed();
        true
    }

    /// Give up the current actor's turn
    pub fn forfeit(&mut self, slot: usize, reason: ForfeitReason) -> bool {
        let Some(actor) = self.acting(slot) else {
            return false;
        };
        let Some(combatant) = self.field.combatant_mut(actor) else {
            return false;
        };
        combatant.forfeit();
        let line = match reason {
            ForfeitReason::NoHealTarget => format!("{} has no ally to heal", combatant.name),
            ForfeitReason::NoLegalTarget => format!("{} has no legal target", combatant.name),
        };

        self.log_line(VerbosityLevel::Normal, line);
        self.record_step(StepAction::Forfeit {
            side: actor.side,
            slot: actor.slot,
        });

        self.queue.advance();
        self.settle();
        self.notify_state_changed();
        true
    }

    /// Apply the outstanding effect at the presentation's impact moment
    ///
    /// Returns false if there was nothing to commit (e.g. the skip path got
    /// there first).
    pub fn commit_effect(&mut self) -> bool {
        self.commit(CommitPath::Timed)
    }

    /// Apply the outstanding effect right away (fast-forward / skip)
    pub fn commit_effect_instant(&mut self) -> bool {
        self.commit(CommitPath::Instant)
    }

    fn commit(&mut self, path: CommitPath) -> bool {
        let Some(effect) = self.pending.take() else {
            return false;
        };
        log_if_verbose!(self, "Committing effect #{} ({:?})", effect.seq(), path);

        match effect {
            DeferredEffect::Attack {
                side,
                attackers,
                defenders,
                ..
            } => {
                *self.field.roster_mut(side) = attackers;
                *self.field.roster_mut(side.opponent()) = defenders;
            }
            DeferredEffect::Heal { side, roster, .. } => {
                *self.field.roster_mut(side) = roster;
            }
        }
        self.resolve_deaths_and_slide();

        self.queue.advance();
        self.settle();
        self.notify_state_changed();
        true
    }

    fn resolve_deaths_and_slide(&mut self) {
        for (side, label) in [(Side::Player, "Player"), (Side::Enemy, "Enemy")] {
            let fallen: Vec<String> = self
                .field
                .roster(side)
                .occupied()
                .filter(|(_, c)| !c.is_alive())
                .map(|(i, c)| format!("{} {} falls at slot {}.", label, c.name, i))
                .collect();
            for line in fallen {
                self.log_line(VerbosityLevel::Normal, line);
            }
        }
        self.field.slide_all();
    }

    fn begin_round(&mut self) {
        self.phase = MatchPhase::RoundStart;
        self.round += 1;
        self.field.refresh_all();

        let order = initiative::combined_order(&self.field, self.seed);
        self.queue.rebuild(&order, &self.field);
        self.log_line(
            VerbosityLevel::Normal,
            format!("Round begins. Order: {}", self.queue.describe()),
        );
        self.record_step(StepAction::RoundStart { round: self.round });
        self.phase = MatchPhase::ActorTurn;
    }

    fn end_round(&mut self) {
        self.phase = MatchPhase::RoundEnd;
        self.log_line(VerbosityLevel::Normal, "Round ends.".to_string());
        self.record_step(StepAction::RoundEnd { round: self.round });
    }

    /// Move the cursor to the next actor able to act
    ///
    /// Skips dead and exhausted entries, closes the round when the queue runs
    /// out and opens the next one, and stops as soon as the match is over.
    fn settle(&mut self) {
        if matches!(self.phase, MatchPhase::Setup | MatchPhase::MatchOver) {
            return;
        }
        loop {
            if self.check_match_over() {
                return;
            }
            match self.queue.locate_current(&self.field) {
                Some(actor) if self.field.can_act(actor) => {
                    self.phase = MatchPhase::ActorTurn;
                    return;
                }
                Some(actor) => {
                    log_if_verbose!(self, "Skipping {} (dead or exhausted)", actor);
                    self.queue.advance();
                }
                None if !self.queue.is_exhausted() => {
                    log_if_verbose!(self, "Skipping queue entry {} (left the field)", self.queue.cursor());
                    self.queue.advance();
                }
                None => {
                    self.end_round();
                    if self.check_match_over() {
                        return;
                    }
                    if self.round >= self.max_rounds {
                        self.finish(MatchOutcome::Draw, EndReason::RoundLimit);
                        return;
                    }
                    self.begin_round();
                }
            }
        }
    }

    fn check_match_over(&mut self) -> bool {
        if self.result.is_some() {
            return true;
        }
        let outcome = match (self.field.player.is_defeated(), self.field.enemy.is_defeated()) {
            (true, true) => MatchOutcome::Draw,
            (false, true) => MatchOutcome::Win,
            (true, false) => MatchOutcome::Loss,
            (false, false) => return false,
        };
        self.finish(outcome, EndReason::Defeat);
        true
    }

    fn finish(&mut self, outcome: MatchOutcome, end_reason: EndReason) {
        let result = MatchResult {
            outcome,
            rounds_played: self.round,
            end_reason,
        };
        self.phase = MatchPhase::MatchOver;
        self.result = Some(result);

        let line = match (end_reason, outcome) {
            (EndReason::RoundLimit, _) => "Round limit reached. Draw.",
            (EndReason::Defeat, MatchOutcome::Draw) => "Both sides fell. Draw.",
            (EndReason::Defeat, MatchOutcome::Win) => "Enemy defeated. You win!",
            (EndReason::Defeat, MatchOutcome::Loss) => "Your team is defeated.",
        };
        self.log_line(VerbosityLevel::Minimal, line.to_string());

        for observer in self.observers.iter_mut() {
            observer.on_match_over(&result);
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.event_seq += 1;
        self.event_seq
    }

    fn log_line(&mut self, level: VerbosityLevel, line: String) {
        self.logger.log(level, &line);
        if level != VerbosityLevel::Silent && level <= VerbosityLevel::Normal {
            self.log.push(line);
        }
    }

    fn record_step(&mut self, action: StepAction) {
        if !self.steps.is_enabled() {
            return;
        }
        let snapshot = FieldSnapshot {
            field: self.field.clone(),
            acting: self.queue.locate_current(&self.field),
            queue_cursor: self.queue.cursor(),
            log_len: self.log.len(),
        };
        self.steps.record(self.round, action, snapshot);
    }

    fn publish(&mut self, event: BattleEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
        self.last_event = Some(event);
    }

    fn notify_state_changed(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.on_state_changed(&self.field);
        }
    }
}

impl Default for MatchController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchController")
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("queue_cursor", &self.queue.cursor())
            .field("pending", &self.pending.as_ref().map(DeferredEffect::seq))
            .field("result", &self.result)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ability, Combatant, CombatantId, House, Role};

    fn unit(id: u64, speed: i32) -> Combatant {
        Combatant::new(CombatantId::new(id), format!("U{id}"), House::Iron, Role::Melee, 5, 1, speed, 2)
    }

    fn mystic(id: u64) -> Combatant {
        unit(id, 9).with_abilities(&[Ability::Resurrect])
    }

    #[test]
    fn test_rejected_resurrect_keeps_summon_id() {
        let mut lineup: Vec<Combatant> = (1..=8).map(|id| unit(id, 1)).collect();
        lineup[0] = mystic(1);
        let mut controller = MatchController::new();
        controller.submit_teams(Roster::from_lineup(lineup), Roster::from_lineup([unit(9, 0)]));
        assert_eq!(controller.current_actor(), Some(ActorRef::new(Side::Player, 0)));
        assert_eq!(controller.summon_ids.peek(), CombatantId::new(10));

        // Full roster, nobody fallen: nothing to raise and nowhere to summon
        assert!(!controller.resurrect(0));
        assert_eq!(controller.summon_ids.peek(), CombatantId::new(10));
        assert_eq!(controller.current_actor(), Some(ActorRef::new(Side::Player, 0)));
        assert!(!controller.field().player.get(0).unwrap().exhausted);
    }

    #[test]
    fn test_summon_takes_next_id() {
        let mut controller = MatchController::new();
        controller.submit_teams(Roster::from_lineup([mystic(4)]), Roster::from_lineup([unit(9, 0)]));

        assert!(controller.resurrect(0));
        assert_eq!(controller.field().player.get(7).unwrap().id, CombatantId::new(10));
        assert_eq!(controller.summon_ids.peek(), CombatantId::new(11));
    }
}
