//! Combatant identity with simple integer IDs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a combatant
///
/// IDs are plain integers handed out by an [`IdAllocator`], so two matches
/// built the same way get the same IDs. Initiative tie-breaks are derived from
/// these, which keeps a match reproducible from its seed and rosters alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    pub fn new(id: u64) -> Self {
        CombatantId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sequential ID source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next_id: 1 }
    }

    /// Start allocating at `first` (useful to keep two rosters' IDs disjoint)
    pub fn starting_at(first: u64) -> Self {
        IdAllocator { next_id: first }
    }

    /// The ID the next call to [`IdAllocator::next_id`] will hand out
    pub fn peek(&self) -> CombatantId {
        CombatantId::new(self.next_id)
    }

    pub fn next_id(&mut self) -> CombatantId {
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
