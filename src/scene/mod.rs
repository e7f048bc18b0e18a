//! Scene state machine: scripted sequences layered over free-roam play.
//!
//! ## Key Types
//!
//! - `SceneScript` / `Situation` / `SituationChoice`: authored content
//! - `LocationRef`: fixed id or "wherever this NPC currently is"
//! - `SceneInstance` / `SceneState`: runtime progress per scene
//! - `SceneDirector`: predicate re-evaluation, seamless advance, transient
//!   teardown
//!
//! A scene persists across free-roam turns in the player's save state and
//! resumes whenever the player's context matches its current situation.

mod director;
mod instance;
mod script;

pub use director::{ChoiceOutcome, ObserveReport, SceneDirector};
pub use instance::{SceneInstance, SceneSnapshot, SceneState};
pub use script::{LocationRef, SceneScript, Situation, SituationChoice, TransientResource};
