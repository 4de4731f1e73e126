//! Autonomous play: action policies, the turn driver and the async loop

pub mod player;
pub mod policy;
pub mod turn;

pub use player::{lock, AutoPlayer, PlayerStatus, SharedController};
pub use policy::{ActionPolicy, DefaultPolicy, PlannedAction, SummonerPolicy};
pub use turn::{act_once, drain, ActOutcome};
