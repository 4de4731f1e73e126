//! Pure battle rules: initiative, targeting, combat resolution and tempo

pub mod combat;
pub mod initiative;
pub mod targeting;
pub mod tempo;

pub use combat::{
    resolve_attack, resolve_heal, resolve_resurrect, summoned_unit, AttackResolution, CombatEvent,
    CombatEventKind, SupportResolution, SUMMONED_UNIT_NAME,
};
pub use initiative::combined_order;
pub use targeting::{heal_targets, offensive_targets, pick_heal_target};
pub use tempo::{BattleSpeed, SpeedProfile};
