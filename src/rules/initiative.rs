//! Initiative: one combined action order across both rosters
//!
//! Ordering, highest priority first:
//! 1. speed (descending)
//! 2. energy (descending)
//! 3. a tie-break value mixed from the combatant's ID and the match seed
//!    (descending)
//! 4. side A before side B, then lower slot first
//!
//! The last rule makes the order total even when everything else ties, so the
//! same field and seed always give the same queue.

use crate::core::{ActorRef, CombatantId, MatchField, Side, ROSTER_SLOTS};
use std::cmp::Ordering;

/// SplitMix64 finalizer
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Per-combatant tie-break value
pub fn tiebreak(id: CombatantId, seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => mix64(mix64(id.as_u64()) ^ seed),
        None => mix64(id.as_u64()),
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    actor: ActorRef,
    speed: i32,
    energy: i32,
    tie: u64,
}

fn compare(a: &Entry, b: &Entry) -> Ordering {
    b.speed
        .cmp(&a.speed)
        .then(b.energy.cmp(&a.energy))
        .then(b.tie.cmp(&a.tie))
        // Side derives Ord with Player < Enemy, so ascending puts side A first
        .then(a.actor.side.cmp(&b.actor.side))
        .then(a.actor.slot.cmp(&b.actor.slot))
}

/// Compute the action order for every living combatant on the field
///
/// Pure: call it again at the start of every round, since the rosters change
/// between rounds.
pub fn combined_order(field: &MatchField, seed: Option<u64>) -> Vec<ActorRef> {
    let mut entries = Vec::with_capacity(ROSTER_SLOTS * 2);
    for slot in 0..ROSTER_SLOTS {
        for side in [Side::Player, Side::Enemy] {
            if let Some(c) = field.roster(side).living(slot) {
                entries.push(Entry {
                    actor: ActorRef::new(side, slot),
                    speed: c.speed,
                    energy: c.energy,
                    tie: tiebreak(c.id, seed),
                });
            }
        }
    }

    entries.sort_by(compare);
    entries.into_iter().map(|e| e.actor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Combatant, House, Role};

    fn unit(id: u64, speed: i32, energy: i32) -> Combatant {
        Combatant::new(CombatantId::new(id), format!("U{id}"), House::Iron, Role::Melee, 5, 1, speed, energy)
    }

    #[test]
    fn test_speed_then_energy() {
        let mut field = MatchField::default();
        field.player.place(unit(1, 2, 9), 0);
        field.player.place(unit(2, 5, 1), 1);
        field.enemy.place(unit(3, 5, 4), 0);

        let order = combined_order(&field, Some(7));
        assert_eq!(
            order,
            vec![
                ActorRef::new(Side::Enemy, 0),
                ActorRef::new(Side::Player, 1),
                ActorRef::new(Side::Player, 0),
            ]
        );
    }

    #[test]
    fn test_dead_combatants_excluded() {
        let mut field = MatchField::default();
        field.player.place(unit(1, 3, 3), 0);
        let mut dead = unit(2, 9, 9);
        dead.hp = 0;
        field.enemy.place(dead, 0);

        let order = combined_order(&field, None);
        assert_eq!(order, vec![ActorRef::new(Side::Player, 0)]);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut field = MatchField::default();
        for slot in 0..ROSTER_SLOTS {
            field.player.place(unit(slot as u64 + 1, 3, 3), slot);
            field.enemy.place(unit(slot as u64 + 100, 3, 3), slot);
        }

        let first = combined_order(&field, Some(42));
        for _ in 0..10 {
            assert_eq!(combined_order(&field, Some(42)), first);
        }
        assert_eq!(first.len(), ROSTER_SLOTS * 2);
    }

    #[test]
    fn test_seed_changes_tie_order() {
        let mut field = MatchField::default();
        for slot in 0..ROSTER_SLOTS {
            field.player.place(unit(slot as u64 + 1, 3, 3), slot);
            field.enemy.place(unit(slot as u64 + 100, 3, 3), slot);
        }

        let orders: Vec<_> = (0..8).map(|s| combined_order(&field, Some(s))).collect();
        assert!(orders.iter().any(|o| *o != orders[0]));
    }

    #[test]
    fn test_compare_falls_back_to_side_then_slot() {
        let mk = |side, slot| Entry {
            actor: ActorRef::new(side, slot),
            speed: 1,
            energy: 1,
            tie: 5,
        };
        let mut entries = vec![mk(Side::Enemy, 0), mk(Side::Player, 2), mk(Side::Player, 1)];
        entries.sort_by(compare);
        let actors: Vec<_> = entries.iter().map(|e| e.actor).collect();
        assert_eq!(
            actors,
            vec![
                ActorRef::new(Side::Player, 1),
                ActorRef::new(Side::Player, 2),
                ActorRef::new(Side::Enemy, 0),
            ]
        );
    }
}
