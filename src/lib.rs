//! Card Battle Simulator
//!
//! Deterministic two-sided autonomous card battles: an 8-slot roster per side,
//! positional targeting, seeded initiative and a round/turn state machine
//! whose attack and heal results wait for an external commit so a
//! presentation layer can time them.

pub mod auto;
pub mod batch;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod game;
pub mod rules;
pub mod session;

pub use error::{BattleError, Result};
