//! Conversation session: piles, pool, and the card-level rules.
//!
//! ## Key Types
//!
//! - `CardPiles`: deck / hand / recyclable discard / exhausted Statements
//! - `ConversationSession`: one conversation's mutable state
//! - `SessionConfig`: deck composition, opening hand, seed, starting pool
//! - `SessionSnapshot`: serializable capture for save/resume

#[allow(clippy::module_inception)]
mod session;
mod piles;

pub use piles::{CardPiles, HAND_LIMIT};
pub use session::{ConversationSession, SessionConfig, SessionSnapshot};
