//! Positional targeting rules
//!
//! Offensive targets live on the opposing roster, heal targets on the actor's
//! own roster. Both functions are pure and return slot indices.

use crate::core::{Ability, ActorRef, Combatant, MatchField, Role, SlotList};
use smallvec::smallvec;

/// Legal offensive targets for `attacker` standing at `actor`
///
/// From the front slot the only possible target is the opposing front slot,
/// and ranged combatants need frontline-ranged to act there at all. From any
/// other slot, plain melee cannot act; otherwise taunt-holders are forced
/// targets, stealth-attack hits the back-most living enemy, and everything
/// else hits the front-most living enemy.
pub fn offensive_targets(attacker: &Combatant, actor: ActorRef, field: &MatchField) -> SlotList {
    let defenders = field.roster(actor.side.opponent());

    if actor.slot == 0 {
        if attacker.role == Role::Ranged && !attacker.has(Ability::FrontlineRanged) {
            return SlotList::new();
        }
        return match defenders.living(0) {
            Some(_) => smallvec![0],
            None => SlotList::new(),
        };
    }

    if attacker.role == Role::Melee && !attacker.has(Ability::StealthAttack) {
        return SlotList::new();
    }

    if defenders.has_living_taunt() {
        return defenders.taunt_indices();
    }

    let pick = if attacker.has(Ability::StealthAttack) {
        defenders.last_alive()
    } else {
        defenders.first_alive()
    };
    pick.into_iter().collect()
}

/// Living allies below maximum health
pub fn heal_targets(actor: ActorRef, field: &MatchField) -> SlotList {
    field
        .roster(actor.side)
        .occupied()
        .filter(|(_, c)| c.is_alive() && c.is_wounded())
        .map(|(i, _)| i)
        .collect()
}

/// Default heal recipient: lowest health ratio, then lowest hp, then lowest slot
pub fn pick_heal_target(actor: ActorRef, field: &MatchField) -> Option<usize> {
    let allies = field.roster(actor.side);
    heal_targets(actor, field)
        .into_iter()
        .filter_map(|i| allies.get(i).map(|c| (i, c)))
        .min_by(|(ia, a), (ib, b)| {
            a.health_ratio()
                .total_cmp(&b.health_ratio())
                .then(a.hp.cmp(&b.hp))
                .then(ia.cmp(ib))
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CombatantId, House, Side};

    fn unit(id: u64, role: Role, abilities: &[Ability]) -> Combatant {
        Combatant::new(CombatantId::new(id), format!("U{id}"), House::Iron, role, 6, 2, 1, 1)
            .with_abilities(abilities)
    }

    fn enemy_line(n: usize) -> MatchField {
        let mut field = MatchField::default();
        for i in 0..n {
            field.enemy.place(unit(100 + i as u64, Role::Melee, &[]), i);
        }
        field
    }

    fn targets_for(field: &MatchField, slot: usize) -> Vec<usize> {
        let actor = ActorRef::new(Side::Player, slot);
        let c = field.combatant(actor).unwrap();
        offensive_targets(c, actor, field).to_vec()
    }

    #[test]
    fn test_front_ranged_needs_frontline_ability() {
        let mut field = enemy_line(3);
        field.player.place(unit(1, Role::Ranged, &[]), 0);
        assert!(targets_for(&field, 0).is_empty());

        let mut field = enemy_line(3);
        field.player.place(unit(1, Role::Ranged, &[Ability::FrontlineRanged]), 0);
        assert_eq!(targets_for(&field, 0), vec![0]);
    }

    #[test]
    fn test_front_targets_only_opposing_front() {
        let mut field = enemy_line(3);
        field.player.place(unit(1, Role::Melee, &[]), 0);
        assert_eq!(targets_for(&field, 0), vec![0]);

        // Fallen front (not yet slid) leaves no target
        field.enemy.get_mut(0).unwrap().hp = 0;
        assert!(targets_for(&field, 0).is_empty());
    }

    #[test]
    fn test_front_ignores_taunt() {
        let mut field = enemy_line(2);
        field.enemy.place(unit(200, Role::Melee, &[Ability::Taunt]), 2);
        field.player.place(unit(1, Role::Melee, &[]), 0);
        assert_eq!(targets_for(&field, 0), vec![0]);
    }

    #[test]
    fn test_back_melee_cannot_act() {
        let mut field = enemy_line(3);
        field.player.place(unit(1, Role::Melee, &[]), 0);
        field.player.place(unit(2, Role::Melee, &[]), 1);
        assert!(targets_for(&field, 1).is_empty());
    }

    #[test]
    fn test_taunt_overrides_stealth_and_default() {
        let mut field = enemy_line(2);
        field.enemy.place(unit(200, Role::Melee, &[Ability::Taunt]), 2);
        field.enemy.place(unit(201, Role::Melee, &[Ability::Taunt]), 4);
        field.player.place(unit(1, Role::Melee, &[]), 0);
        field.player.place(unit(2, Role::Ranged, &[]), 1);
        field.player.place(unit(3, Role::Stealth, &[Ability::StealthAttack]), 2);

        assert_eq!(targets_for(&field, 1), vec![2, 4]);
        assert_eq!(targets_for(&field, 2), vec![2, 4]);
    }

    #[test]
    fn test_stealth_hits_back_most() {
        let mut field = enemy_line(4);
        field.enemy.get_mut(3).unwrap().hp = 0;
        field.player.place(unit(1, Role::Melee, &[]), 0);
        field.player.place(unit(2, Role::Stealth, &[Ability::StealthAttack]), 1);
        assert_eq!(targets_for(&field, 1), vec![2]);
    }

    #[test]
    fn test_stealth_melee_may_act_from_back() {
        let mut field = enemy_line(3);
        field.player.place(unit(1, Role::Melee, &[]), 0);
        field.player.place(unit(2, Role::Melee, &[Ability::StealthAttack]), 1);
        assert_eq!(targets_for(&field, 1), vec![2]);
    }

    #[test]
    fn test_ranged_back_hits_front_most() {
        let mut field = enemy_line(3);
        field.enemy.get_mut(0).unwrap().hp = -2;
        field.player.place(unit(1, Role::Melee, &[]), 0);
        field.player.place(unit(2, Role::Ranged, &[]), 3);
        assert_eq!(targets_for(&field, 3), vec![1]);
    }

    #[test]
    fn test_no_living_enemies() {
        let mut field = MatchField::default();
        field.player.place(unit(1, Role::Melee, &[]), 0);
        field.player.place(unit(2, Role::Ranged, &[]), 1);
        assert!(targets_for(&field, 1).is_empty());
    }

    #[test]
    fn test_heal_target_selection() {
        let mut field = MatchField::default();
        let healer = ActorRef::new(Side::Player, 0);
        field.player.place(unit(1, Role::Healer, &[]), 0);
        field.player.place(unit(2, Role::Melee, &[]).with_max_hp(12), 1); // 6/12
        field.player.place(unit(3, Role::Melee, &[]).with_max_hp(6), 2); // full
        field.player.place(unit(4, Role::Melee, &[]).with_max_hp(12), 3); // 6/12
        let mut fallen = unit(5, Role::Melee, &[]).with_max_hp(12);
        fallen.hp = 0;
        field.player.place(fallen, 4);

        assert_eq!(heal_targets(healer, &field).as_slice(), &[1, 3]);
        // Same ratio and hp, lower slot wins
        assert_eq!(pick_heal_target(healer, &field), Some(1));

        field.player.get_mut(3).unwrap().hp = 5;
        assert_eq!(pick_heal_target(healer, &field), Some(3));
    }

    #[test]
    fn test_ratio_beats_absolute_hp() {
        let mut field = MatchField::default();
        let healer = ActorRef::new(Side::Enemy, 0);
        field.enemy.place(unit(1, Role::Healer, &[]), 0);
        let mut big = unit(2, Role::Melee, &[]).with_max_hp(20);
        big.hp = 5; // 0.25
        let mut small = unit(3, Role::Melee, &[]).with_max_hp(4);
        small.hp = 2; // 0.5
        field.enemy.place(big, 1);
        field.enemy.place(small, 2);

        assert_eq!(pick_heal_target(healer, &field), Some(1));
    }

    #[test]
    fn test_no_heal_target_when_all_full() {
        let mut field = MatchField::default();
        field.player.place(unit(1, Role::Healer, &[]), 0);
        assert_eq!(pick_heal_target(ActorRef::new(Side::Player, 0), &field), None);
    }
}
