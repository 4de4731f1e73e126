//! Combatant definitions

use crate::core::{Ability, AbilitySet, CombatantId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Faction a combatant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum House {
    Iron,
    Range,
    Stealth,
    Arcana,
}

impl House {
    pub const ALL: [House; 4] = [House::Iron, House::Range, House::Stealth, House::Arcana];

    pub fn display_name(&self) -> &'static str {
        match self {
            House::Iron => "Iron",
            House::Range => "Range",
            House::Stealth => "Stealth",
            House::Arcana => "Arcana",
        }
    }

    /// Baseline (hp, atk) for cards of this house
    pub fn stat_bias(&self) -> (i32, i32) {
        match self {
            House::Iron => (12, 3),
            House::Range => (7, 5),
            House::Stealth => (8, 4),
            House::Arcana => (7, 3),
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Battlefield role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Melee,
    Ranged,
    Stealth,
    Healer,
    Arcane,
}

/// A single combatant on a roster
///
/// Combatants are built at team loading and mutated in place for the rest of
/// the match. A combatant is alive iff `hp > 0`; hit points may go negative
/// transiently after a big hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub house: House,
    pub role: Role,
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub speed: i32,

    /// Initiative weight and team-building cost. Never spent in battle.
    pub energy: i32,

    /// Per-round attack readiness, refreshed from `energy` each round
    pub readiness: i32,

    pub abilities: AbilitySet,

    /// Set once the combatant has acted this round
    pub exhausted: bool,
}

impl Combatant {
    /// Create a combatant at full health
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        house: House,
        role: Role,
        hp: i32,
        atk: i32,
        speed: i32,
        energy: i32,
    ) -> Self {
        Combatant {
            id,
            name: name.into(),
            house,
            role,
            hp,
            max_hp: hp,
            atk,
            speed,
            energy,
            readiness: energy,
            abilities: AbilitySet::empty(),
            exhausted: false,
        }
    }

    pub fn with_abilities(mut self, abilities: &[Ability]) -> Self {
        self.abilities = AbilitySet::of(abilities);
        self
    }

    pub fn with_max_hp(mut self, max_hp: i32) -> Self {
        self.max_hp = max_hp;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn has(&self, ability: Ability) -> bool {
        self.abilities.contains(ability)
    }

    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }

    /// Current health as a fraction of maximum
    pub fn health_ratio(&self) -> f64 {
        self.hp as f64 / self.max_hp.max(1) as f64
    }

    /// Whether this combatant is allowed to heal at all
    pub fn can_heal(&self) -> bool {
        self.role == Role::Healer || self.has(Ability::MinorHeal)
    }

    /// Clear per-round state at the start of a round
    pub fn refresh(&mut self) {
        self.exhausted = false;
        self.readiness = self.energy;
    }

    /// Give up this round's action
    pub fn forfeit(&mut self) {
        self.exhausted = true;
        self.readiness = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Combatant {
        Combatant::new(CombatantId::new(1), "Iron Vanguard", House::Iron, Role::Melee, 12, 3, 3, 4)
            .with_abilities(&[Ability::Taunt])
    }

    #[test]
    fn test_combatant_creation() {
        let c = sample();

        assert_eq!(c.max_hp, 12);
        assert_eq!(c.readiness, 4);
        assert!(c.is_alive());
        assert!(!c.is_wounded());
        assert!(c.has(Ability::Taunt));
        assert!(!c.exhausted);
    }

    #[test]
    fn test_alive_threshold() {
        let mut c = sample();
        c.hp = 0;
        assert!(!c.is_alive());
        c.hp = -3;
        assert!(!c.is_alive());
        c.hp = 1;
        assert!(c.is_alive());
    }

    #[test]
    fn test_forfeit_and_refresh() {
        let mut c = sample();
        c.forfeit();
        assert!(c.exhausted);
        assert_eq!(c.readiness, 0);
        assert_eq!(c.energy, 4);

        c.refresh();
        assert!(!c.exhausted);
        assert_eq!(c.readiness, 4);
    }

    #[test]
    fn test_heal_qualification() {
        let medic = Combatant::new(CombatantId::new(2), "Field Medic", House::Iron, Role::Healer, 6, 2, 2, 3);
        assert!(medic.can_heal());

        let hybrid = sample().with_abilities(&[Ability::MinorHeal]);
        assert!(hybrid.can_heal());

        assert!(!sample().can_heal());
    }

    #[test]
    fn test_house_bias() {
        assert_eq!(House::Iron.stat_bias(), (12, 3));
        assert_eq!(House::Range.stat_bias(), (7, 5));
        assert_eq!(House::Arcana.to_string(), "Arcana");
    }
}
