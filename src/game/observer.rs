//! Match observers
//!
//! The controller mutates state first and notifies afterwards, so state
//! transitions can be tested without any observer attached.

use crate::core::MatchField;
use crate::game::{BattleEvent, MatchResult};

/// Receives notifications from a [`MatchController`](crate::game::MatchController)
pub trait MatchObserver {
    /// A new action was resolved and is waiting to be committed
    fn on_event(&mut self, _event: &BattleEvent) {}

    /// The field changed (commit, resurrection, forfeit, round boundary)
    fn on_state_changed(&mut self, _field: &MatchField) {}

    /// The match reached a terminal state
    fn on_match_over(&mut self, _result: &MatchResult) {}
}

/// Forwards events into a tokio broadcast channel
pub struct ChannelObserver {
    tx: tokio::sync::broadcast::Sender<BattleEvent>,
}

impl ChannelObserver {
    pub fn new(tx: tokio::sync::broadcast::Sender<BattleEvent>) -> Self {
        ChannelObserver { tx }
    }
}

impl MatchObserver for ChannelObserver {
    fn on_event(&mut self, event: &BattleEvent) {
        // No subscribers is fine; events are fire-and-forget
        let _ = self.tx.send(event.clone());
    }
}
