//! World-state collaborator interface.
//!
//! The engine never owns world entities. Every effect and every scene
//! predicate reads and writes the world through [`WorldState`], synchronously;
//! entity-not-found failures surface as [`WorldError`] and are mapped to
//! precondition failures by the effect engine.
//!
//! Mutations are split by fallibility. Operations that cannot reasonably
//! reject (granting an item, revealing a fact, advancing time) return `()`;
//! operations that dereference an entity return `Result`. The effect engine
//! validates every fallible operation against a staged view before committing,
//! so a commit-time rejection is a collaborator contract violation.
//!
//! [`MemoryWorld`] is the reference implementation used by tests and
//! single-process embeddings.

mod memory;

pub use memory::MemoryWorld;

use crate::core::{
    FactId, ItemId, LetterId, LocationId, NpcId, ObligationId, RouteId, TokenKind, WorldError,
};

/// Synchronous query/mutation interface over world entities.
pub trait WorldState {
    // === Queries ===

    /// Current location of an NPC.
    fn npc_location(&self, npc: &NpcId) -> Result<LocationId, WorldError>;

    /// NPCs currently present at a location.
    fn npcs_at(&self, location: &LocationId) -> Vec<NpcId>;

    /// Does the NPC exist at all?
    fn npc_exists(&self, npc: &NpcId) -> bool;

    /// Does the location exist (locked or not)?
    fn location_exists(&self, location: &LocationId) -> bool;

    /// Is the location unlocked for travel?
    fn location_unlocked(&self, location: &LocationId) -> bool;

    /// Is the route unlocked?
    fn route_unlocked(&self, route: &RouteId) -> bool;

    /// Is the NPC unlocked for interaction?
    fn npc_unlocked(&self, npc: &NpcId) -> bool;

    /// Current balance of a token currency.
    fn token_balance(&self, token: &TokenKind) -> i64;

    /// Has this fact been revealed?
    fn is_revealed(&self, fact: &FactId) -> bool;

    /// Is this item held?
    fn has_item(&self, item: &ItemId) -> bool;

    /// The delivery queue, in order.
    fn letter_queue(&self) -> Vec<LetterId>;

    /// Does this obligation exist?
    fn has_obligation(&self, obligation: &ObligationId) -> bool;

    /// Is a negotiation with this NPC open?
    fn negotiation_open(&self, npc: &NpcId) -> bool;

    /// Current in-game time, in segments.
    fn now(&self) -> i64;

    // === Mutations ===

    /// Adjust a token balance. Balances are validated by the caller.
    fn modify_token(&mut self, token: &TokenKind, delta: i64);

    /// Mark a fact revealed. Re-revealing is a no-op.
    fn reveal(&mut self, fact: &FactId);

    /// Create a new (unlocked) location.
    fn create_location(&mut self, location: &LocationId) -> Result<(), WorldError>;

    /// Destroy a location, removing it from the world.
    fn destroy_location(&mut self, location: &LocationId) -> Result<(), WorldError>;

    /// Put an item in the player's inventory.
    fn grant_item(&mut self, item: &ItemId);

    /// Remove an item from the player's inventory.
    fn remove_item(&mut self, item: &ItemId) -> Result<(), WorldError>;

    /// Unlock a travel route.
    fn unlock_route(&mut self, route: &RouteId);

    /// Unlock an NPC for interaction.
    fn unlock_npc(&mut self, npc: &NpcId);

    /// Unlock an existing locked location.
    fn unlock_location(&mut self, location: &LocationId) -> Result<(), WorldError>;

    /// Register a new obligation.
    fn create_obligation(&mut self, obligation: &ObligationId);

    /// Push a letter's deadline out by the given segments.
    fn extend_deadline(&mut self, letter: &LetterId, segments: i64) -> Result<(), WorldError>;

    /// Move a letter to a new position in the queue.
    fn reorder_letter(&mut self, letter: &LetterId, position: usize) -> Result<(), WorldError>;

    /// Swap two letters' queue positions.
    fn swap_letters(&mut self, first: &LetterId, second: &LetterId) -> Result<(), WorldError>;

    /// Remove a letter from the queue.
    fn remove_letter(&mut self, letter: &LetterId) -> Result<(), WorldError>;

    /// Append a letter to the queue.
    fn add_letter(&mut self, letter: &LetterId);

    /// Advance in-game time.
    fn advance_time(&mut self, segments: i64);

    /// Adjust a per-NPC numeric state value.
    fn modify_npc_state(&mut self, npc: &NpcId, key: &str, delta: i64) -> Result<(), WorldError>;

    /// Open a negotiation with an NPC.
    fn open_negotiation(&mut self, npc: &NpcId) -> Result<(), WorldError>;
}
