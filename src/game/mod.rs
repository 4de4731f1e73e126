//! Match state machine, events, logging and replay

pub mod controller;
pub mod events;
pub mod logger;
pub mod observer;
pub mod queue;
pub mod step_log;

pub use controller::{
    EndReason, ForfeitReason, MatchController, MatchOutcome, MatchPhase, MatchResult, DEFAULT_MAX_ROUNDS,
};
pub use events::{BattleEvent, CommitPath, DeferredEffect, PresentationEvent};
pub use logger::{BattleLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use observer::{ChannelObserver, MatchObserver};
pub use queue::{ActionQueue, QueueEntry};
pub use step_log::{FieldSnapshot, StepAction, StepLog, StepRecord};
