//! Card catalog: definitions, the process-wide table, and content loading.
//!
//! ## Key Types
//!
//! - `Card`: immutable definition (type, depth, persistence, cost, branches)
//! - `CardCatalog`: read-only lookup table, shared by reference (`Arc`)
//!   across all sessions, never mutated after load
//! - `loader::load_catalog`: JSON content format entry point
//!
//! Catalog construction is the only place content is validated; a lookup
//! failing later means the content was never loaded, which is fatal.

mod card;
#[allow(clippy::module_inception)]
mod catalog;
pub mod loader;

pub use card::{Card, CardType, OutcomeBranches, Persistence, FOUNDATION_DEPTH};
pub use catalog::CardCatalog;
pub use loader::load_catalog;
