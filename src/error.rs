//! Error types for the battle simulator
//!
//! The simulation core never returns these: an action that cannot proceed is
//! reported as "no effect" (`None` / `false`). Only configuration, team loading
//! and batch plumbing surface errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Match configuration unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BattleError>;
