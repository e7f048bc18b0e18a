//! Core engine types: identifiers, resources, RNG, and error classes.
//!
//! These are the building blocks shared by every component. Content and
//! world entities are referenced by typed string ids; the resource pool and
//! RNG are owned per session.

pub mod context;
pub mod error;
pub mod ids;
pub mod resources;
pub mod rng;

pub use context::ContextEvent;
pub use error::{ContentError, PreconditionFailure, RuleViolation, SceneError, WorldError};
pub use ids::{
    CardId, FactId, ItemId, LetterId, LocationId, NpcId, ObligationId, RouteId, SceneId, TokenKind,
};
pub use resources::{ResourceKind, ResourcePool, CADENCE_FLOOR};
pub use rng::{SessionRng, SessionRngState};
