//! Combat resolution
//!
//! Pure functions over rosters. Each one either returns the updated roster(s)
//! with an event and a log line, or `None` when a precondition fails. `None`
//! means nothing happened; callers treat it as a failed action attempt.

use crate::core::{Ability, Combatant, CombatantId, House, Role, Roster, Side};
use serde::{Deserialize, Serialize};

/// Name of the unit summoned by resurrection into an empty slot
pub const SUMMONED_UNIT_NAME: &str = "Arcane Shade";

/// What an action did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEventKind {
    Hit { damage: i32 },
    Heal { amount: i32 },
    Resurrect { name: String },
    Summon { name: String },
}

/// Structured record of a resolved action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub kind: CombatEventKind,
    /// Side of the acting combatant
    pub side: Side,
    /// Slot of the acting combatant
    pub actor: usize,
    /// Slot acted upon (on the opposing roster for hits, own roster otherwise)
    pub target: usize,
}

/// Result of an attack: both rosters change
#[derive(Debug, Clone)]
pub struct AttackResolution {
    pub attackers: Roster,
    pub defenders: Roster,
    pub event: CombatEvent,
    pub description: String,
}

/// Result of a heal or resurrection: only the acting side changes
#[derive(Debug, Clone)]
pub struct SupportResolution {
    pub roster: Roster,
    pub event: CombatEvent,
    pub description: String,
}

/// The fixed weak unit resurrection summons into an empty slot
pub fn summoned_unit(id: CombatantId) -> Combatant {
    Combatant::new(id, SUMMONED_UNIT_NAME, House::Arcana, Role::Arcane, 1, 2, 2, 3)
}

fn ready_to_act(c: &Combatant) -> bool {
    c.is_alive() && !c.exhausted
}

/// Strike `target` on the defending roster with the combatant at `attacker`
///
/// Requires a living, unexhausted attacker with positive readiness and a
/// living target. Damage equals the attacker's attack power; hit points may
/// drop below zero.
pub fn resolve_attack(
    attackers: &Roster,
    defenders: &Roster,
    side: Side,
    attacker: usize,
    target: usize,
) -> Option<AttackResolution> {
    let striker = attackers.get(attacker).filter(|c| ready_to_act(c) && c.readiness > 0)?;
    let victim = defenders.living(target)?;

    let damage = striker.atk;
    let description = format!(
        "{} {} hits {} {} for {}.",
        side.tag(),
        striker.name,
        side.opponent().tag(),
        victim.name,
        damage
    );

    let mut attackers = attackers.clone();
    let mut defenders = defenders.clone();
    if let Some(v) = defenders.get_mut(target) {
        v.hp -= damage;
    }
    if let Some(s) = attackers.get_mut(attacker) {
        s.exhausted = true;
    }

    Some(AttackResolution {
        attackers,
        defenders,
        event: CombatEvent {
            kind: CombatEventKind::Hit { damage },
            side,
            actor: attacker,
            target,
        },
        description,
    })
}

/// Heal the ally at `target` with the combatant at `healer`
///
/// The healer must be alive, unexhausted and either a healer by role or hold
/// minor-heal. Heals for the healer's attack stat (at least 1), capped at the
/// target's maximum.
pub fn resolve_heal(roster: &Roster, side: Side, healer: usize, target: usize) -> Option<SupportResolution> {
    let medic = roster.get(healer).filter(|c| ready_to_act(c) && c.can_heal())?;
    let ally = roster.living(target)?;

    let amount = medic.atk.max(1);
    let description = format!("{} {} heals {} +{}.", side.tag(), medic.name, ally.name, amount);

    let mut roster = roster.clone();
    if let Some(a) = roster.get_mut(target) {
        a.hp = (a.hp + amount).min(a.max_hp);
    }
    if let Some(m) = roster.get_mut(healer) {
        m.exhausted = true;
    }

    Some(SupportResolution {
        roster,
        event: CombatEvent {
            kind: CombatEventKind::Heal { amount },
            side,
            actor: healer,
            target,
        },
        description,
    })
}

/// Restore a fallen ally or summon a unit into an empty slot
///
/// The lowest fallen slot comes back at 1 hp. With nobody fallen, the
/// highest empty slot receives [`summoned_unit`]. With neither, nothing
/// happens. `summon_id` is the ID the summoned unit gets if one appears.
pub fn resolve_resurrect(
    roster: &Roster,
    side: Side,
    caster: usize,
    summon_id: CombatantId,
) -> Option<SupportResolution> {
    let mystic = roster.get(caster).filter(|c| ready_to_act(c) && c.has(Ability::Resurrect))?;
    let mystic_name = mystic.name.clone();

    let mut roster = roster.clone();
    let (kind, target, description) = if let Some(fallen) = roster.first_fallen() {
        let revived = roster.get_mut(fallen)?;
        revived.hp = 1;
        let name = revived.name.clone();
        let line = format!("{} {} resurrects {} to 1 HP.", side.tag(), mystic_name, name);
        (CombatEventKind::Resurrect { name }, fallen, line)
    } else if let Some(empty) = roster.last_empty() {
        roster.place(summoned_unit(summon_id), empty);
        let line = format!("{} {} summons an {}.", side.tag(), mystic_name, SUMMONED_UNIT_NAME);
        (
            CombatEventKind::Summon {
                name: SUMMONED_UNIT_NAME.to_string(),
            },
            empty,
            line,
        )
    } else {
        return None;
    };

    if let Some(m) = roster.get_mut(caster) {
        m.exhausted = true;
    }

    Some(SupportResolution {
        roster,
        event: CombatEvent {
            kind,
            side,
            actor: caster,
            target,
        },
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ROSTER_SLOTS;

    fn unit(id: u64, role: Role, hp: i32, atk: i32) -> Combatant {
        Combatant::new(CombatantId::new(id), format!("U{id}"), House::Iron, role, hp, atk, 1, 2)
    }

    #[test]
    fn test_attack_reduces_hp_and_exhausts() {
        let attackers = Roster::from_lineup([unit(1, Role::Melee, 6, 3)]);
        let defenders = Roster::from_lineup([unit(2, Role::Melee, 5, 1)]);

        let r = resolve_attack(&attackers, &defenders, Side::Player, 0, 0).unwrap();
        assert_eq!(r.defenders.get(0).unwrap().hp, 2);
        assert!(r.defenders.get(0).unwrap().is_alive());
        assert!(r.attackers.get(0).unwrap().exhausted);
        assert_eq!(r.event.kind, CombatEventKind::Hit { damage: 3 });
        assert_eq!(r.description, "[P] U1 hits [E] U2 for 3.");

        // Inputs untouched
        assert_eq!(defenders.get(0).unwrap().hp, 5);
    }

    #[test]
    fn test_repeated_attacks_kill() {
        let attackers = Roster::from_lineup([unit(1, Role::Melee, 6, 3)]);
        let mut defenders = Roster::from_lineup([unit(2, Role::Melee, 5, 1)]);

        let mut hits = 0;
        while defenders.get(0).unwrap().is_alive() {
            let r = resolve_attack(&attackers, &defenders, Side::Enemy, 0, 0).unwrap();
            defenders = r.defenders;
            hits += 1;
        }
        assert_eq!(hits, 2);
        assert_eq!(defenders.get(0).unwrap().hp, -1);

        // Dead target rejects further attacks
        assert!(resolve_attack(&attackers, &defenders, Side::Enemy, 0, 0).is_none());
    }

    #[test]
    fn test_attack_preconditions() {
        let defenders = Roster::from_lineup([unit(2, Role::Melee, 5, 1)]);

        let mut tired = unit(1, Role::Melee, 6, 3);
        tired.exhausted = true;
        assert!(resolve_attack(&Roster::from_lineup([tired]), &defenders, Side::Player, 0, 0).is_none());

        let mut unready = unit(1, Role::Melee, 6, 3);
        unready.readiness = 0;
        assert!(resolve_attack(&Roster::from_lineup([unready]), &defenders, Side::Player, 0, 0).is_none());

        let fresh = Roster::from_lineup([unit(1, Role::Melee, 6, 3)]);
        assert!(resolve_attack(&fresh, &defenders, Side::Player, 0, 5).is_none());
        assert!(resolve_attack(&fresh, &defenders, Side::Player, 3, 0).is_none());
        assert!(resolve_attack(&fresh, &defenders, Side::Player, 99, 0).is_none());
    }

    #[test]
    fn test_heal_amount_and_cap() {
        let mut ally = unit(2, Role::Melee, 8, 1);
        ally.hp = 3;
        let roster = Roster::from_lineup([unit(1, Role::Healer, 6, 2), ally]);

        let r = resolve_heal(&roster, Side::Player, 0, 1).unwrap();
        assert_eq!(r.roster.get(1).unwrap().hp, 5);
        assert_eq!(r.event.kind, CombatEventKind::Heal { amount: 2 });
        assert!(r.roster.get(0).unwrap().exhausted);

        let mut ally = unit(2, Role::Melee, 8, 1);
        ally.hp = 7;
        let roster = Roster::from_lineup([unit(1, Role::Healer, 6, 2), ally]);
        let r = resolve_heal(&roster, Side::Player, 0, 1).unwrap();
        assert_eq!(r.roster.get(1).unwrap().hp, 8);
    }

    #[test]
    fn test_heal_minimum_one() {
        let mut ally = unit(2, Role::Melee, 8, 1);
        ally.hp = 3;
        let roster = Roster::from_lineup([unit(1, Role::Healer, 6, 0), ally]);
        let r = resolve_heal(&roster, Side::Enemy, 0, 1).unwrap();
        assert_eq!(r.roster.get(1).unwrap().hp, 4);
        assert_eq!(r.description, "[E] U1 heals U2 +1.");
    }

    #[test]
    fn test_heal_requires_qualified_healer() {
        let mut ally = unit(2, Role::Melee, 8, 1);
        ally.hp = 3;
        let roster = Roster::from_lineup([unit(1, Role::Melee, 6, 2), ally.clone()]);
        assert!(resolve_heal(&roster, Side::Player, 0, 1).is_none());

        let hybrid = unit(1, Role::Melee, 6, 2).with_abilities(&[Ability::MinorHeal]);
        let roster = Roster::from_lineup([hybrid, ally]);
        assert!(resolve_heal(&roster, Side::Player, 0, 1).is_some());
    }

    #[test]
    fn test_heal_dead_target_rejected() {
        let mut ally = unit(2, Role::Melee, 8, 1);
        ally.hp = 0;
        let roster = Roster::from_lineup([unit(1, Role::Healer, 6, 2), ally]);
        assert!(resolve_heal(&roster, Side::Player, 0, 1).is_none());
    }

    #[test]
    fn test_resurrect_restores_first_fallen() {
        let caster = unit(1, Role::Arcane, 7, 3).with_abilities(&[Ability::Resurrect]);
        let mut roster = Roster::from_lineup((0..8).map(|i| unit(10 + i, Role::Melee, 4, 1)));
        roster.set(0, Some(caster));
        roster.get_mut(3).unwrap().hp = -2;
        roster.get_mut(5).unwrap().hp = 0;

        let r = resolve_resurrect(&roster, Side::Player, 0, CombatantId::new(999)).unwrap();
        assert_eq!(r.roster.get(3).unwrap().hp, 1);
        assert_eq!(r.roster.get(5).unwrap().hp, 0);
        assert!(r.roster.get(0).unwrap().exhausted);
        assert_eq!(r.event.target, 3);
        assert_eq!(r.event.kind, CombatEventKind::Resurrect { name: "U13".to_string() });
    }

    #[test]
    fn test_resurrect_summons_into_last_empty() {
        let caster = unit(1, Role::Arcane, 7, 3).with_abilities(&[Ability::Resurrect]);
        let roster = Roster::from_lineup([caster, unit(2, Role::Melee, 4, 1)]);

        let r = resolve_resurrect(&roster, Side::Enemy, 0, CombatantId::new(999)).unwrap();
        let shade = r.roster.get(ROSTER_SLOTS - 1).unwrap();
        assert_eq!(shade.name, SUMMONED_UNIT_NAME);
        assert_eq!(shade.hp, 1);
        assert_eq!(shade.atk, 2);
        assert_eq!(shade.id, CombatantId::new(999));
        assert!(r.roster.get(0).unwrap().exhausted);
        assert_eq!(r.description, "[E] U1 summons an Arcane Shade.");
    }

    #[test]
    fn test_resurrect_noop_when_full_and_healthy() {
        let caster = unit(1, Role::Arcane, 7, 3).with_abilities(&[Ability::Resurrect]);
        let mut roster = Roster::from_lineup((0..8).map(|i| unit(10 + i, Role::Melee, 4, 1)));
        roster.set(0, Some(caster));
        assert!(resolve_resurrect(&roster, Side::Player, 0, CombatantId::new(999)).is_none());
    }

    #[test]
    fn test_resurrect_requires_ability() {
        let roster = Roster::from_lineup([unit(1, Role::Arcane, 7, 3)]);
        assert!(resolve_resurrect(&roster, Side::Player, 0, CombatantId::new(999)).is_none());
    }
}
