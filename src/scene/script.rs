//! Scene scripts: the authored shape of a multi-situation sequence.
//!
//! A script is content: an ordered list of situations, each carrying a
//! resumption predicate and a set of player choices. Runtime progress lives
//! in [`SceneInstance`](super::SceneInstance), never here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{ItemId, LocationId, NpcId, SceneId, WorldError};
use crate::effects::{Effect, EffectList};
use crate::world::WorldState;

/// Where a situation resumes.
///
/// The `AtNpc` form is the load-bearing one: it resolves to the referenced
/// NPC's location *at evaluation time*, so a situation authored as "wherever
/// Elena is" keeps working after Elena relocates. Binding a literal id
/// captured at authoring time is exactly the defect class this avoids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationRef {
    /// A literal location id.
    Fixed(LocationId),
    /// Wherever the referenced NPC currently is.
    AtNpc(NpcId),
}

impl LocationRef {
    /// Resolve to a concrete location against the current world.
    pub fn resolve(&self, world: &dyn WorldState) -> Result<LocationId, WorldError> {
        match self {
            LocationRef::Fixed(location) => Ok(location.clone()),
            LocationRef::AtNpc(npc) => world.npc_location(npc),
        }
    }
}

/// A world resource a scene creates and must tear down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransientResource {
    /// A generated, scene-scoped location.
    Location(LocationId),
    /// A scene-scoped inventory item.
    Item(ItemId),
}

impl std::fmt::Display for TransientResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransientResource::Location(location) => write!(f, "location {location}"),
            TransientResource::Item(item) => write!(f, "item {item}"),
        }
    }
}

/// One selectable choice inside a situation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationChoice {
    /// Short display label.
    pub label: String,
    /// Effect branch applied atomically when chosen.
    pub effects: EffectList,
    /// Transient resources created on completion, ledgered for teardown.
    pub spawns: Vec<TransientResource>,
}

impl SituationChoice {
    /// A choice with no effects or spawns.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            effects: EffectList::new(),
            spawns: Vec::new(),
        }
    }

    /// Attach effects (builder pattern).
    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects = effects.into_iter().collect();
        self
    }

    /// Attach a spawned transient (builder pattern).
    #[must_use]
    pub fn spawning(mut self, resource: TransientResource) -> Self {
        self.spawns.push(resource);
        self
    }
}

/// One gated step of a scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    /// Where this situation resumes.
    pub location: LocationRef,
    /// NPC that must be present, if any.
    pub required_npc: Option<NpcId>,
    /// The choices surfaced when the predicate matches.
    pub choices: Vec<SituationChoice>,
}

impl Situation {
    /// A situation at a fixed location.
    #[must_use]
    pub fn at(location: impl Into<LocationId>) -> Self {
        Self {
            location: LocationRef::Fixed(location.into()),
            required_npc: None,
            choices: Vec::new(),
        }
    }

    /// A situation at the referenced NPC's current location.
    #[must_use]
    pub fn wherever(npc: impl Into<NpcId>) -> Self {
        Self {
            location: LocationRef::AtNpc(npc.into()),
            required_npc: None,
            choices: Vec::new(),
        }
    }

    /// Require an NPC to be present (builder pattern).
    #[must_use]
    pub fn with_npc(mut self, npc: impl Into<NpcId>) -> Self {
        self.required_npc = Some(npc.into());
        self
    }

    /// Add a choice (builder pattern).
    #[must_use]
    pub fn with_choice(mut self, choice: SituationChoice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// An authored scene: an ordered sequence of situations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneScript {
    pub id: SceneId,
    pub situations: Vec<Situation>,
}

impl SceneScript {
    /// Build a script.
    #[must_use]
    pub fn new(id: impl Into<SceneId>, situations: Vec<Situation>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            situations,
        })
    }
}
