//! Turn driver: submit one policy choice to the controller

use crate::auto::{ActionPolicy, PlannedAction};
use crate::game::{ForfeitReason, MatchController, MatchResult};

/// What happened when the driver asked for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActOutcome {
    /// An attack or heal is waiting to be committed
    Deferred,
    /// The action (or a forfeit) changed the field immediately
    Applied,
    /// An earlier effect is still outstanding; nothing was submitted
    Blocked,
    /// No actor is waiting (no match yet, or the match is over)
    Idle,
}

fn submit(controller: &mut MatchController, action: PlannedAction) -> bool {
    match action {
        PlannedAction::Attack { slot, target } => controller.attack(slot, target),
        PlannedAction::Heal { slot, target } => controller.heal(slot, target),
        PlannedAction::Resurrect { slot } => controller.resurrect(slot),
        PlannedAction::Forfeit { slot, reason } => controller.forfeit(slot, reason),
    }
}

/// Perform exactly one actor's action
///
/// A choice the controller rejects turns into a forfeit so the queue always
/// makes progress.
pub fn act_once(controller: &mut MatchController, policy: &mut dyn ActionPolicy) -> ActOutcome {
    if controller.has_pending_effect() {
        return ActOutcome::Blocked;
    }
    let Some(actor) = controller.current_actor() else {
        return ActOutcome::Idle;
    };

    let action = policy.choose_action(actor, controller.field());
    if !submit(controller, action) {
        controller.logger.verbose(&format!("{} rejected {:?}; forfeiting", actor, action));
        if !controller.forfeit(actor.slot, ForfeitReason::NoLegalTarget) {
            return ActOutcome::Idle;
        }
    }

    if controller.has_pending_effect() {
        ActOutcome::Deferred
    } else {
        ActOutcome::Applied
    }
}

/// Play the match to the end, committing every effect instantly
pub fn drain(controller: &mut MatchController, policy: &mut dyn ActionPolicy) -> Option<MatchResult> {
    while !controller.is_over() {
        if controller.has_pending_effect() {
            controller.commit_effect_instant();
            continue;
        }
        if act_once(controller, policy) == ActOutcome::Idle {
            break;
        }
    }
    controller.result()
}
