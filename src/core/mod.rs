//! Entity model: combatants, rosters and the match field

pub mod abilities;
pub mod combatant;
pub mod entity;
pub mod field;
pub mod roster;

pub use abilities::{Ability, AbilitySet};
pub use combatant::{Combatant, House, Role};
pub use entity::{CombatantId, IdAllocator};
pub use field::{ActorRef, MatchField, Side};
pub use roster::{Roster, SlotList, ROSTER_SLOTS};
