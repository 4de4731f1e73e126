//! Card content and team building
//!
//! Card templates, the standard card pool, the two demo rosters and a
//! budget-constrained opponent drafter. Rosters can also be loaded from JSON
//! as a [`RosterSpec`].

use crate::core::{Ability, AbilitySet, Combatant, IdAllocator, House, Role, Roster, ROSTER_SLOTS};
use crate::{BattleError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A combatant before it has an ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub name: String,
    pub house: House,
    pub role: Role,
    pub hp: i32,
    pub atk: i32,
    pub speed: i32,
    pub energy: i32,
    #[serde(default)]
    pub abilities: AbilitySet,
}

impl CombatantTemplate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        house: House,
        role: Role,
        hp: i32,
        atk: i32,
        speed: i32,
        energy: i32,
        abilities: &[Ability],
    ) -> Self {
        CombatantTemplate {
            name: name.into(),
            house,
            role,
            hp,
            atk,
            speed,
            energy,
            abilities: AbilitySet::of(abilities),
        }
    }

    /// Template using its house's (hp, atk) bias
    pub fn biased(
        name: impl Into<String>,
        house: House,
        role: Role,
        speed: i32,
        energy: i32,
        abilities: &[Ability],
    ) -> Self {
        let (hp, atk) = house.stat_bias();
        Self::new(name, house, role, hp, atk, speed, energy, abilities)
    }

    pub fn instantiate(&self, ids: &mut IdAllocator) -> Combatant {
        let mut combatant = Combatant::new(
            ids.next_id(),
            self.name.clone(),
            self.house,
            self.role,
            self.hp,
            self.atk,
            self.speed,
            self.energy,
        );
        combatant.abilities = self.abilities;
        combatant
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BattleError::InvalidRoster("combatant with empty name".to_string()));
        }
        if self.hp <= 0 {
            return Err(BattleError::InvalidRoster(format!("{} has non-positive hp", self.name)));
        }
        if self.atk < 0 || self.speed < 0 || self.energy < 0 {
            return Err(BattleError::InvalidRoster(format!("{} has a negative stat", self.name)));
        }
        Ok(())
    }
}

/// A front-to-back lineup loadable from JSON
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub lineup: Vec<CombatantTemplate>,
}

impl RosterSpec {
    pub fn new(lineup: Vec<CombatantTemplate>) -> Self {
        RosterSpec { name: None, lineup }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let spec: RosterSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lineup.len() > ROSTER_SLOTS {
            return Err(BattleError::InvalidRoster(format!(
                "{} combatants do not fit {} slots",
                self.lineup.len(),
                ROSTER_SLOTS
            )));
        }
        self.lineup.iter().try_for_each(CombatantTemplate::validate)
    }

    pub fn total_energy(&self) -> i32 {
        self.lineup.iter().map(|t| t.energy).sum()
    }

    /// Build a roster, rejecting it if it exceeds `energy_cap`
    pub fn build(&self, ids: &mut IdAllocator, energy_cap: Option<u32>) -> Result<Roster> {
        self.validate()?;
        let roster = Roster::from_lineup(self.lineup.iter().map(|t| t.instantiate(ids)));
        if let Some(cap) = energy_cap {
            let cap = i32::try_from(cap).unwrap_or(i32::MAX);
            if !roster.fits_budget(cap) {
                return Err(BattleError::InvalidRoster(format!(
                    "total energy {} exceeds the budget of {}",
                    roster.total_energy(),
                    cap
                )));
            }
        }
        Ok(roster)
    }
}

/// Cards available for team building
pub fn card_pool() -> Vec<CombatantTemplate> {
    vec![
        CombatantTemplate::new("Iron Vanguard", House::Iron, Role::Melee, 12, 3, 3, 3, &[Ability::Taunt]),
        CombatantTemplate::new("Field Medic", House::Iron, Role::Healer, 6, 2, 2, 2, &[Ability::MinorHeal]),
        CombatantTemplate::new("Sharpshot", House::Range, Role::Ranged, 7, 5, 4, 3, &[]),
        CombatantTemplate::new("Shadowblade", House::Stealth, Role::Stealth, 8, 4, 5, 3, &[Ability::StealthAttack]),
        CombatantTemplate::new("Soul Stitcher", House::Arcana, Role::Arcane, 7, 3, 3, 4, &[Ability::Resurrect]),
    ]
}

/// The player's demo lineup
pub fn demo_player() -> RosterSpec {
    RosterSpec {
        name: Some("Demo Player".to_string()),
        lineup: vec![
            CombatantTemplate::biased("Iron Vanguard", House::Iron, Role::Melee, 3, 4, &[Ability::Taunt]),
            CombatantTemplate::new("Field Medic", House::Iron, Role::Healer, 6, 2, 2, 3, &[Ability::MinorHeal]),
            CombatantTemplate::biased("Sharpshot", House::Range, Role::Ranged, 4, 5, &[]),
            CombatantTemplate::biased("Shadowblade", House::Stealth, Role::Stealth, 5, 4, &[Ability::StealthAttack]),
        ],
    }
}

/// The enemy's demo lineup
pub fn demo_enemy() -> RosterSpec {
    RosterSpec {
        name: Some("Demo Enemy".to_string()),
        lineup: vec![
            CombatantTemplate::new("Bulwark", House::Iron, Role::Melee, 12, 3, 2, 6, &[Ability::Taunt]),
            CombatantTemplate::new("Soul Weaver", House::Arcana, Role::Arcane, 7, 3, 3, 4, &[Ability::Resurrect]),
            CombatantTemplate::new("Backstabber", House::Stealth, Role::Stealth, 8, 4, 5, 8, &[Ability::StealthAttack]),
        ],
    }
}

/// Fill a lineup from `pool` without exceeding `energy_cap`
///
/// Draws uniformly among the cards that still fit until nothing fits or the
/// roster is full. Deterministic for a given RNG state.
pub fn draft_opponent<R: Rng + ?Sized>(pool: &[CombatantTemplate], energy_cap: u32, rng: &mut R) -> RosterSpec {
    let mut remaining = i64::from(energy_cap);
    let mut lineup = Vec::new();

    while lineup.len() < ROSTER_SLOTS {
        let affordable: Vec<&CombatantTemplate> =
            pool.iter().filter(|t| i64::from(t.energy) <= remaining).collect();
        let Some(pick) = affordable.choose(rng) else {
            break;
        };
        remaining -= i64::from(pick.energy);
        lineup.push((*pick).clone());
    }

    RosterSpec {
        name: Some("Drafted Opponent".to_string()),
        lineup,
    }
}
