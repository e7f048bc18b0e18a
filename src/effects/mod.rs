//! Effect system: the closed variant set and its atomic resolver.
//!
//! - `Effect`: every mechanical consequence a card or scene choice can carry
//! - `EffectResolver`: all-or-nothing application of one outcome branch
//! - `describe`: pure derivation of player-facing description records
//!
//! ## Design Philosophy
//!
//! The variant set is closed on purpose. Whole-branch atomicity needs every
//! precondition checkable before anything commits, which one exhaustive
//! resolver can guarantee and an open set of independently-implemented
//! behaviors cannot.

mod describe;
mod effect;
mod resolver;

pub use describe::{describe, describe_branch, EffectCategory, EffectDescription};
pub use effect::{net_initiative, Effect, EffectList};
pub use resolver::EffectResolver;
