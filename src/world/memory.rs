//! In-memory world state for tests and single-process embeddings.

use im::{HashMap as ImHashMap, HashSet as ImHashSet, Vector};
use serde::{Deserialize, Serialize};

use crate::core::{
    FactId, ItemId, LetterId, LocationId, NpcId, ObligationId, RouteId, TokenKind, WorldError,
};

use super::WorldState;

/// Reference [`WorldState`] implementation backed by persistent maps.
///
/// Cloning is cheap, which the test suites lean on to snapshot a world and
/// assert it unchanged after a rolled-back effect branch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryWorld {
    npcs: ImHashMap<NpcId, LocationId>,
    unlocked_npcs: ImHashSet<NpcId>,
    locations: ImHashSet<LocationId>,
    locked_locations: ImHashSet<LocationId>,
    unlocked_routes: ImHashSet<RouteId>,
    items: ImHashSet<ItemId>,
    revealed: ImHashSet<FactId>,
    tokens: ImHashMap<TokenKind, i64>,
    obligations: ImHashSet<ObligationId>,
    letters: Vector<LetterId>,
    deadlines: ImHashMap<LetterId, i64>,
    npc_state: ImHashMap<(NpcId, String), i64>,
    negotiations: ImHashSet<NpcId>,
    time: i64,
}

impl MemoryWorld {
    /// An empty world at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a location (builder style).
    #[must_use]
    pub fn with_location(mut self, location: impl Into<LocationId>) -> Self {
        self.locations.insert(location.into());
        self
    }

    /// Add a locked location (builder style).
    #[must_use]
    pub fn with_locked_location(mut self, location: impl Into<LocationId>) -> Self {
        let location = location.into();
        self.locations.insert(location.clone());
        self.locked_locations.insert(location);
        self
    }

    /// Place an NPC at a location (builder style). The location is created
    /// if it does not exist yet.
    #[must_use]
    pub fn with_npc(mut self, npc: impl Into<NpcId>, location: impl Into<LocationId>) -> Self {
        let location = location.into();
        self.locations.insert(location.clone());
        self.npcs.insert(npc.into(), location);
        self
    }

    /// Append a letter to the delivery queue (builder style).
    #[must_use]
    pub fn with_letter(mut self, letter: impl Into<LetterId>) -> Self {
        self.letters.push_back(letter.into());
        self
    }

    /// Seed a token balance (builder style).
    #[must_use]
    pub fn with_tokens(mut self, token: impl Into<TokenKind>, balance: i64) -> Self {
        self.tokens.insert(token.into(), balance);
        self
    }

    /// Move an NPC to a different location.
    pub fn move_npc(&mut self, npc: &NpcId, location: impl Into<LocationId>) {
        let location = location.into();
        self.locations.insert(location.clone());
        self.npcs.insert(npc.clone(), location);
    }

    /// Remove an NPC from the world entirely.
    pub fn remove_npc(&mut self, npc: &NpcId) {
        self.npcs.remove(npc);
        self.unlocked_npcs.remove(npc);
        self.negotiations.remove(npc);
    }

    /// A letter's deadline, if one was ever set or extended.
    #[must_use]
    pub fn deadline(&self, letter: &LetterId) -> Option<i64> {
        self.deadlines.get(letter).copied()
    }

    /// A per-NPC numeric state value.
    #[must_use]
    pub fn npc_state(&self, npc: &NpcId, key: &str) -> i64 {
        self.npc_state
            .get(&(npc.clone(), key.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl WorldState for MemoryWorld {
    fn npc_location(&self, npc: &NpcId) -> Result<LocationId, WorldError> {
        self.npcs
            .get(npc)
            .cloned()
            .ok_or_else(|| WorldError::NpcNotFound(npc.clone()))
    }

    fn npcs_at(&self, location: &LocationId) -> Vec<NpcId> {
        self.npcs
            .iter()
            .filter(|(_, loc)| *loc == location)
            .map(|(npc, _)| npc.clone())
            .collect()
    }

    fn npc_exists(&self, npc: &NpcId) -> bool {
        self.npcs.contains_key(npc)
    }

    fn location_exists(&self, location: &LocationId) -> bool {
        self.locations.contains(location)
    }

    fn location_unlocked(&self, location: &LocationId) -> bool {
        self.locations.contains(location) && !self.locked_locations.contains(location)
    }

    fn route_unlocked(&self, route: &RouteId) -> bool {
        self.unlocked_routes.contains(route)
    }

    fn npc_unlocked(&self, npc: &NpcId) -> bool {
        self.unlocked_npcs.contains(npc)
    }

    fn token_balance(&self, token: &TokenKind) -> i64 {
        self.tokens.get(token).copied().unwrap_or(0)
    }

    fn is_revealed(&self, fact: &FactId) -> bool {
        self.revealed.contains(fact)
    }

    fn has_item(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    fn letter_queue(&self) -> Vec<LetterId> {
        self.letters.iter().cloned().collect()
    }

    fn has_obligation(&self, obligation: &ObligationId) -> bool {
        self.obligations.contains(obligation)
    }

    fn negotiation_open(&self, npc: &NpcId) -> bool {
        self.negotiations.contains(npc)
    }

    fn now(&self) -> i64 {
        self.time
    }

    fn modify_token(&mut self, token: &TokenKind, delta: i64) {
        let balance = self.tokens.entry(token.clone()).or_insert(0);
        *balance += delta;
    }

    fn reveal(&mut self, fact: &FactId) {
        self.revealed.insert(fact.clone());
    }

    fn create_location(&mut self, location: &LocationId) -> Result<(), WorldError> {
        if self.locations.contains(location) {
            return Err(WorldError::LocationExists(location.clone()));
        }
        self.locations.insert(location.clone());
        Ok(())
    }

    fn destroy_location(&mut self, location: &LocationId) -> Result<(), WorldError> {
        if self.locations.remove(location).is_none() {
            return Err(WorldError::LocationNotFound(location.clone()));
        }
        self.locked_locations.remove(location);
        Ok(())
    }

    fn grant_item(&mut self, item: &ItemId) {
        self.items.insert(item.clone());
    }

    fn remove_item(&mut self, item: &ItemId) -> Result<(), WorldError> {
        self.items
            .remove(item)
            .map(|_| ())
            .ok_or_else(|| WorldError::ItemNotFound(item.clone()))
    }

    fn unlock_route(&mut self, route: &RouteId) {
        self.unlocked_routes.insert(route.clone());
    }

    fn unlock_npc(&mut self, npc: &NpcId) {
        self.unlocked_npcs.insert(npc.clone());
    }

    fn unlock_location(&mut self, location: &LocationId) -> Result<(), WorldError> {
        if !self.locations.contains(location) {
            return Err(WorldError::LocationNotFound(location.clone()));
        }
        self.locked_locations.remove(location);
        Ok(())
    }

    fn create_obligation(&mut self, obligation: &ObligationId) {
        self.obligations.insert(obligation.clone());
    }

    fn extend_deadline(&mut self, letter: &LetterId, segments: i64) -> Result<(), WorldError> {
        if !self.letters.contains(letter) {
            return Err(WorldError::LetterNotFound(letter.clone()));
        }
        let deadline = self.deadlines.entry(letter.clone()).or_insert(0);
        *deadline += segments;
        Ok(())
    }

    fn reorder_letter(&mut self, letter: &LetterId, position: usize) -> Result<(), WorldError> {
        let current = self
            .letters
            .index_of(letter)
            .ok_or_else(|| WorldError::LetterNotFound(letter.clone()))?;
        let letter = self.letters.remove(current);
        let position = position.min(self.letters.len());
        self.letters.insert(position, letter);
        Ok(())
    }

    fn swap_letters(&mut self, first: &LetterId, second: &LetterId) -> Result<(), WorldError> {
        let a = self
            .letters
            .index_of(first)
            .ok_or_else(|| WorldError::LetterNotFound(first.clone()))?;
        let b = self
            .letters
            .index_of(second)
            .ok_or_else(|| WorldError::LetterNotFound(second.clone()))?;
        self.letters.swap(a, b);
        Ok(())
    }

    fn remove_letter(&mut self, letter: &LetterId) -> Result<(), WorldError> {
        let index = self
            .letters
            .index_of(letter)
            .ok_or_else(|| WorldError::LetterNotFound(letter.clone()))?;
        self.letters.remove(index);
        self.deadlines.remove(letter);
        Ok(())
    }

    fn add_letter(&mut self, letter: &LetterId) {
        self.letters.push_back(letter.clone());
    }

    fn advance_time(&mut self, segments: i64) {
        self.time += segments;
    }

    fn modify_npc_state(&mut self, npc: &NpcId, key: &str, delta: i64) -> Result<(), WorldError> {
        if !self.npcs.contains_key(npc) {
            return Err(WorldError::NpcNotFound(npc.clone()));
        }
        let value = self
            .npc_state
            .entry((npc.clone(), key.to_string()))
            .or_insert(0);
        *value += delta;
        Ok(())
    }

    fn open_negotiation(&mut self, npc: &NpcId) -> Result<(), WorldError> {
        if !self.npcs.contains_key(npc) {
            return Err(WorldError::NpcNotFound(npc.clone()));
        }
        self.negotiations.insert(npc.clone());
        Ok(())
    }
}
