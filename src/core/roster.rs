//! Rosters: fixed 8-slot front-to-back lineups

use crate::core::{Ability, Combatant};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Number of slots on every roster
pub const ROSTER_SLOTS: usize = 8;

/// Slot indices, sized so a full roster never spills to the heap
pub type SlotList = SmallVec<[usize; ROSTER_SLOTS]>;

/// One side's lineup
///
/// Slot 0 is the front line. Each slot is either empty or holds a combatant
/// (alive or fallen). Fallen combatants stay in place until the next
/// [`Roster::slide`], which compacts the living toward the front.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Roster {
    slots: [Option<Combatant>; ROSTER_SLOTS],
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from a front-to-back list
    ///
    /// Anything past the last slot is dropped.
    pub fn from_lineup(lineup: impl IntoIterator<Item = Combatant>) -> Self {
        let mut roster = Roster::new();
        for (idx, combatant) in lineup.into_iter().take(ROSTER_SLOTS).enumerate() {
            roster.slots[idx] = Some(combatant);
        }
        roster
    }

    /// Put a combatant into an empty slot
    ///
    /// Returns false (and changes nothing) if the index is out of range or
    /// the slot is occupied.
    pub fn place(&mut self, combatant: Combatant, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(combatant);
                true
            }
            _ => false,
        }
    }

    /// Overwrite a slot unconditionally (no-op when out of range)
    pub fn set(&mut self, index: usize, combatant: Option<Combatant>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = combatant;
        }
    }

    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Combatant> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// The combatant at `index`, only if it is alive
    pub fn living(&self, index: usize) -> Option<&Combatant> {
        self.get(index).filter(|c| c.is_alive())
    }

    pub fn slots(&self) -> &[Option<Combatant>; ROSTER_SLOTS] {
        &self.slots
    }

    /// Occupied slots in front-to-back order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &Combatant)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (i, c)))
    }

    pub fn occupied_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.slots.iter_mut().flatten()
    }

    /// Pure compaction: living combatants moved to the front in order
    pub fn compacted(&self) -> Roster {
        Roster::from_lineup(self.occupied().filter(|(_, c)| c.is_alive()).map(|(_, c)| c.clone()))
    }

    /// Compact in place, discarding fallen combatants
    pub fn slide(&mut self) {
        *self = self.compacted();
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn last_empty(&self) -> Option<usize> {
        self.slots.iter().rposition(Option::is_none)
    }

    /// Lowest slot holding a fallen combatant (hp <= 0)
    pub fn first_fallen(&self) -> Option<usize> {
        self.occupied().find(|(_, c)| !c.is_alive()).map(|(i, _)| i)
    }

    pub fn alive_indices(&self) -> SlotList {
        self.occupied().filter(|(_, c)| c.is_alive()).map(|(i, _)| i).collect()
    }

    /// Slots holding a living taunt-holder
    pub fn taunt_indices(&self) -> SlotList {
        self.occupied()
            .filter(|(_, c)| c.is_alive() && c.has(Ability::Taunt))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_living_taunt(&self) -> bool {
        self.occupied().any(|(_, c)| c.is_alive() && c.has(Ability::Taunt))
    }

    pub fn first_alive(&self) -> Option<usize> {
        self.occupied().find(|(_, c)| c.is_alive()).map(|(i, _)| i)
    }

    pub fn last_alive(&self) -> Option<usize> {
        self.alive_indices().last().copied()
    }

    /// Energy summed over occupied slots (team-building budget)
    pub fn total_energy(&self) -> i32 {
        self.occupied().map(|(_, c)| c.energy).sum()
    }

    pub fn fits_budget(&self, energy_cap: i32) -> bool {
        self.total_energy() <= energy_cap
    }

    pub fn len(&self) -> usize {
        self.occupied().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// No combatant with positive hit points (including an empty roster)
    pub fn is_defeated(&self) -> bool {
        !self.occupied().any(|(_, c)| c.is_alive())
    }

    /// Clear every combatant's per-round state
    pub fn refresh_all(&mut self) {
        for combatant in self.occupied_mut() {
            combatant.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CombatantId, House, Role};

    fn unit(id: u64, hp: i32) -> Combatant {
        Combatant::new(CombatantId::new(id), format!("Unit {id}"), House::Iron, Role::Melee, hp, 2, 1, 2)
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_range() {
        let mut roster = Roster::new();
        assert!(roster.place(unit(1, 5), 0));
        assert!(!roster.place(unit(2, 5), 0));
        assert!(!roster.place(unit(3, 5), ROSTER_SLOTS));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(0).unwrap().id, CombatantId::new(1));
    }

    #[test]
    fn test_slide_preserves_order() {
        let mut roster = Roster::new();
        roster.place(unit(1, 0), 0);
        roster.place(unit(2, 4), 2);
        roster.place(unit(3, -1), 3);
        roster.place(unit(4, 7), 5);

        roster.slide();

        let ids: Vec<u64> = roster.occupied().map(|(_, c)| c.id.as_u64()).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(roster.get(0).is_some());
        assert!(roster.get(1).is_some());
        assert!(roster.get(2).is_none());
    }

    #[test]
    fn test_compacted_is_pure() {
        let mut roster = Roster::new();
        roster.place(unit(1, 0), 0);
        roster.place(unit(2, 3), 1);

        let compacted = roster.compacted();
        assert_eq!(compacted.get(0).unwrap().id, CombatantId::new(2));
        // input untouched
        assert_eq!(roster.get(0).unwrap().id, CombatantId::new(1));
    }

    #[test]
    fn test_queries() {
        let mut roster = Roster::new();
        roster.place(unit(1, 5), 0);
        roster.place(unit(2, 5).with_abilities(&[Ability::Taunt]), 1);
        roster.place(unit(3, 0).with_abilities(&[Ability::Taunt]), 2);
        roster.place(unit(4, 5), 4);

        assert_eq!(roster.first_empty(), Some(3));
        assert_eq!(roster.last_empty(), Some(7));
        assert_eq!(roster.alive_indices().as_slice(), &[0, 1, 4]);
        assert_eq!(roster.taunt_indices().as_slice(), &[1]);
        assert!(roster.has_living_taunt());
        assert_eq!(roster.first_fallen(), Some(2));
        assert_eq!(roster.last_alive(), Some(4));
        assert_eq!(roster.total_energy(), 8);
        assert!(roster.fits_budget(8));
        assert!(!roster.fits_budget(7));
    }

    #[test]
    fn test_defeated() {
        assert!(Roster::new().is_defeated());

        let mut roster = Roster::new();
        roster.place(unit(1, 0), 0);
        roster.place(unit(2, -4), 1);
        assert!(roster.is_defeated());

        roster.place(unit(3, 1), 2);
        assert!(!roster.is_defeated());
    }
}
