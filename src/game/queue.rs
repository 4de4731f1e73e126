//! Per-round action queue

use crate::core::{ActorRef, CombatantId, MatchField};
use serde::{Deserialize, Serialize};

/// One queued turn
///
/// Slots shift when a roster compacts after a death, so each entry remembers
/// which combatant it was built for and follows it to its current slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub actor: ActorRef,
    pub id: CombatantId,
}

/// Ordered actor references for the current round plus a cursor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionQueue {
    entries: Vec<QueueEntry>,
    cursor: usize,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a fresh initiative order and rewind the cursor
    pub fn rebuild(&mut self, order: &[ActorRef], field: &MatchField) {
        self.entries = order
            .iter()
            .filter_map(|actor| {
                field
                    .combatant(*actor)
                    .map(|c| QueueEntry { actor: *actor, id: c.id })
            })
            .collect();
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn advance(&mut self) {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_entry(&self) -> Option<QueueEntry> {
        self.entries.get(self.cursor).copied()
    }

    /// Where the current entry's combatant stands now
    ///
    /// `None` if the queue is exhausted or the combatant has left the field.
    pub fn locate_current(&self, field: &MatchField) -> Option<ActorRef> {
        let entry = self.current_entry()?;
        field
            .roster(entry.actor.side)
            .occupied()
            .find(|(_, c)| c.id == entry.id)
            .map(|(slot, _)| ActorRef::new(entry.actor.side, slot))
    }

    /// Human-readable order, e.g. "P#1, E#2"
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.actor.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
