//! # parlance
//!
//! A card-driven conversation engine with scripted scene resumption.
//!
//! Conversations are played from a deck: cards cost Initiative, build
//! Momentum, and accrue Doubt; listening is the pressure valve. Scenes layer
//! scripted multi-situation sequences over free-roam play and resume
//! automatically whenever the player's location and company match.
//!
//! ## Design Principles
//!
//! 1. **Closed effect set**: every mechanical consequence is one variant of
//!    one enum, resolved by one exhaustive resolver. That is what makes
//!    all-or-nothing branch application a guarantee instead of a hope.
//!
//! 2. **Content is immutable**: the card catalog loads once, validates once,
//!    and is shared by reference. Sessions only ever hold ids.
//!
//! 3. **The world is a collaborator**: the engine reads and writes world
//!    entities through the [`world::WorldState`] trait and holds no copy of
//!    its own.
//!
//! 4. **Dynamic resumption binding**: a situation can be bound to "wherever
//!    this NPC currently is" rather than a location id frozen at authoring
//!    time, so scenes survive NPCs that move.
//!
//! ## Modules
//!
//! - `core`: ids, resources, RNG, context events, error classes
//! - `catalog`: card definitions, the process-wide table, content loading
//! - `effects`: the effect enum, descriptions, and the atomic resolver
//! - `session`: per-conversation piles, pool, and card-level rules
//! - `conversation`: the turn state machine and outcome adjudication
//! - `scene`: scripted sequences with context-predicate resumption
//! - `world`: the world-state collaborator interface and an in-memory impl
//! - `save`: save/resume capture

pub mod catalog;
pub mod conversation;
pub mod core;
pub mod effects;
pub mod save;
pub mod scene;
pub mod session;
pub mod world;

// Re-export commonly used types
pub use crate::core::{
    CardId, ContentError, ContextEvent, FactId, ItemId, LetterId, LocationId, NpcId, ObligationId,
    PreconditionFailure, ResourceKind, ResourcePool, RouteId, RuleViolation, SceneError, SceneId,
    SessionRng, SessionRngState, TokenKind, WorldError,
};

pub use crate::catalog::{load_catalog, Card, CardCatalog, CardType, Persistence};

pub use crate::effects::{
    describe, describe_branch, Effect, EffectCategory, EffectDescription, EffectList,
    EffectResolver,
};

pub use crate::session::{ConversationSession, SessionConfig, SessionSnapshot, HAND_LIMIT};

pub use crate::conversation::{
    CardPreview, ChanceAdjudicator, ConversationFacade, ConversationSummary, FixedOutcome, Outcome,
    OutcomeAdjudicator, ThresholdAdjudicator, TurnAction, TurnPhase, TurnReport,
};

pub use crate::scene::{
    ChoiceOutcome, LocationRef, ObserveReport, SceneDirector, SceneInstance, SceneScript,
    SceneSnapshot, SceneState, Situation, SituationChoice, TransientResource,
};

pub use crate::world::{MemoryWorld, WorldState};

pub use crate::save::{SaveError, SaveState};
