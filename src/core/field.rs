//! The match field: one roster per side

use crate::core::{Combatant, Roster};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which roster a reference points into
///
/// `Player` is side A (the local team), `Enemy` is side B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    /// Short tag used in the battle log ("[P]" / "[E]")
    pub fn tag(self) -> &'static str {
        match self {
            Side::Player => "[P]",
            Side::Enemy => "[E]",
        }
    }
}

/// Identifies whose turn it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub side: Side,
    pub slot: usize,
}

impl ActorRef {
    pub fn new(side: Side, slot: usize) -> Self {
        ActorRef { side, slot }
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.side {
            Side::Player => "P",
            Side::Enemy => "E",
        };
        write!(f, "{}#{}", prefix, self.slot + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchField {
    pub player: Roster,
    pub enemy: Roster,
}

impl MatchField {
    pub fn new(player: Roster, enemy: Roster) -> Self {
        MatchField { player, enemy }
    }

    pub fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn combatant(&self, actor: ActorRef) -> Option<&Combatant> {
        self.roster(actor.side).get(actor.slot)
    }

    pub fn combatant_mut(&mut self, actor: ActorRef) -> Option<&mut Combatant> {
        self.roster_mut(actor.side).get_mut(actor.slot)
    }

    /// Whether the referenced combatant exists, is alive and has not acted
    pub fn can_act(&self, actor: ActorRef) -> bool {
        self.combatant(actor)
            .is_some_and(|c| c.is_alive() && !c.exhausted)
    }

    pub fn slide_all(&mut self) {
        self.player.slide();
        self.enemy.slide();
    }

    pub fn refresh_all(&mut self) {
        self.player.refresh_all();
        self.enemy.refresh_all();
    }
}
