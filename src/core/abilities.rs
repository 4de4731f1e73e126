//! Ability flags
//!
//! A small bitset over [`Ability`]. The flags carry no behavior of their own;
//! what each one means lives in the targeting and combat resolvers.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Taunt,
    MinorHeal,
    Resurrect,
    StealthAttack,
    FrontlineRanged,
    Splash,
    Lifesteal,
}

impl Ability {
    pub const ALL: [Ability; 7] = [
        Ability::Taunt,
        Ability::MinorHeal,
        Ability::Resurrect,
        Ability::StealthAttack,
        Ability::FrontlineRanged,
        Ability::Splash,
        Ability::Lifesteal,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of abilities held by a combatant
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Ability>", from = "Vec<Ability>")]
pub struct AbilitySet(u8);

impl AbilitySet {
    pub const fn empty() -> Self {
        AbilitySet(0)
    }

    pub fn of(abilities: &[Ability]) -> Self {
        abilities.iter().fold(Self::empty(), |set, a| set.with(*a))
    }

    pub fn with(self, ability: Ability) -> Self {
        AbilitySet(self.0 | ability.bit())
    }

    pub fn insert(&mut self, ability: Ability) {
        self.0 |= ability.bit();
    }

    pub fn remove(&mut self, ability: Ability) {
        self.0 &= !ability.bit();
    }

    pub fn contains(&self, ability: Ability) -> bool {
        self.0 & ability.bit() != 0
    }

    pub fn union(self, other: AbilitySet) -> Self {
        AbilitySet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Ability> + '_ {
        Ability::ALL.into_iter().filter(|a| self.contains(*a))
    }
}

impl From<Vec<Ability>> for AbilitySet {
    fn from(abilities: Vec<Ability>) -> Self {
        AbilitySet::of(&abilities)
    }
}

impl From<AbilitySet> for Vec<Ability> {
    fn from(set: AbilitySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for AbilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_and_union() {
        let a = AbilitySet::of(&[Ability::Taunt, Ability::MinorHeal]);
        let b = AbilitySet::empty().with(Ability::StealthAttack);

        assert!(a.contains(Ability::Taunt));
        assert!(!a.contains(Ability::StealthAttack));

        let both = a.union(b);
        assert_eq!(both.iter().count(), 3);
        assert!(both.contains(Ability::StealthAttack));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = AbilitySet::empty();
        assert!(set.is_empty());

        set.insert(Ability::Resurrect);
        assert!(set.contains(Ability::Resurrect));

        set.remove(Ability::Resurrect);
        assert!(set.is_empty());
    }

    #[test]
    fn test_serializes_as_names() {
        let set = AbilitySet::of(&[Ability::FrontlineRanged, Ability::Taunt]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["taunt","frontline_ranged"]"#);

        let back: AbilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
