//! Player context events.
//!
//! A context event is emitted whenever the player's situation changes:
//! entering a location, encountering an NPC, or completing a conversation
//! turn. The scene state machine re-evaluates its resumption predicates on
//! every one of them.

use serde::{Deserialize, Serialize};

use super::ids::{LocationId, NpcId};

/// Where the player is and who they are facing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEvent {
    /// The player's current location.
    pub location: LocationId,
    /// The NPC the player is engaging, if any.
    pub npc: Option<NpcId>,
}

impl ContextEvent {
    /// Context for being somewhere with nobody engaged.
    #[must_use]
    pub fn at(location: impl Into<LocationId>) -> Self {
        Self {
            location: location.into(),
            npc: None,
        }
    }

    /// Context for engaging an NPC at a location.
    #[must_use]
    pub fn with_npc(location: impl Into<LocationId>, npc: impl Into<NpcId>) -> Self {
        Self {
            location: location.into(),
            npc: Some(npc.into()),
        }
    }
}
