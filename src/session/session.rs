//! Per-conversation mutable state.
//!
//! A session exists from the moment a conversation interaction starts until
//! the player exits back to free roam. It owns the card piles, the resource
//! pool, and the session RNG; the catalog it draws definitions from is
//! shared and immutable.
//!
//! The session enforces the card-level rules (card in hand, affordable cost,
//! momentum gates, hand limit). Turn orchestration lives in the facade.

use serde::{Deserialize, Serialize};

use crate::catalog::{Card, CardCatalog, Persistence};
use crate::core::{
    CardId, ContentError, LocationId, NpcId, ResourcePool, RuleViolation, SessionRng,
    SessionRngState,
};

use super::piles::{CardPiles, HAND_LIMIT};

/// How a new session is seeded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial deck composition (an ordered multiset of catalog ids).
    pub deck: Vec<CardId>,
    /// Cards drawn before the first turn.
    pub opening_hand: usize,
    /// RNG seed for shuffles.
    pub seed: u64,
    /// Starting resources. Zeroed unless the scenario says otherwise.
    pub pool: ResourcePool,
}

impl SessionConfig {
    /// A config with a zeroed pool and the default opening hand.
    #[must_use]
    pub fn new(deck: Vec<CardId>, seed: u64) -> Self {
        Self {
            deck,
            opening_hand: 4,
            seed,
            pool: ResourcePool::new(),
        }
    }

    /// Seed the starting pool (builder pattern).
    #[must_use]
    pub fn with_pool(mut self, pool: ResourcePool) -> Self {
        self.pool = pool;
        self
    }

    /// Override the opening hand size (builder pattern).
    #[must_use]
    pub fn with_opening_hand(mut self, cards: usize) -> Self {
        self.opening_hand = cards;
        self
    }
}

/// Mutable state of one conversation.
#[derive(Clone, Debug)]
pub struct ConversationSession {
    npc: NpcId,
    location: LocationId,
    piles: CardPiles,
    pool: ResourcePool,
    turn: u32,
    rng: SessionRng,
}

impl ConversationSession {
    /// Start a session: validate the deck against the catalog, shuffle, and
    /// draw the opening hand.
    ///
    /// An unknown card id in the deck composition is a content defect and
    /// fails the start outright.
    pub fn start(
        npc: impl Into<NpcId>,
        location: impl Into<LocationId>,
        config: SessionConfig,
        catalog: &CardCatalog,
    ) -> Result<Self, ContentError> {
        for id in &config.deck {
            catalog.get(id)?;
        }

        let mut rng = SessionRng::new(config.seed);
        let mut piles = CardPiles::new(config.deck);
        piles.shuffle_deck(&mut rng);

        let mut session = Self {
            npc: npc.into(),
            location: location.into(),
            piles,
            pool: config.pool,
            turn: 0,
            rng,
        };

        for _ in 0..config.opening_hand {
            session.draw();
        }

        tracing::info!(npc = %session.npc, hand = session.piles.hand().len(), "conversation started");
        Ok(session)
    }

    /// The conversation partner.
    #[must_use]
    pub fn npc(&self) -> &NpcId {
        &self.npc
    }

    /// Where the conversation is happening.
    #[must_use]
    pub fn location(&self) -> &LocationId {
        &self.location
    }

    /// Current resources.
    #[must_use]
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    /// Cards in hand.
    #[must_use]
    pub fn hand(&self) -> &[CardId] {
        self.piles.hand()
    }

    /// Draw pile size.
    #[must_use]
    pub fn deck_len(&self) -> usize {
        self.piles.deck_len()
    }

    /// Recyclable discard size.
    #[must_use]
    pub fn discard_len(&self) -> usize {
        self.piles.discard_len()
    }

    /// Consumed Statement count.
    #[must_use]
    pub fn exhausted_len(&self) -> usize {
        self.piles.exhausted_len()
    }

    /// Completed turn count.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub(crate) fn next_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// Draw one card, reshuffling the recyclable discard if the deck is dry.
    ///
    /// Returns `None` only when there is nothing left to draw anywhere.
    pub fn draw(&mut self) -> Option<CardId> {
        self.piles.draw(&mut self.rng)
    }

    /// Is the hand over the limit, pending a discard-down?
    #[must_use]
    pub fn discard_down_pending(&self) -> bool {
        self.piles.over_hand_limit()
    }

    /// Check the card-level rules for playing `card`.
    ///
    /// Rejections mutate nothing.
    pub fn validate_play(&self, card: &Card) -> Result<(), RuleViolation> {
        if self.piles.over_hand_limit() {
            return Err(RuleViolation::DiscardPending);
        }
        if !self.piles.in_hand(&card.id) {
            return Err(RuleViolation::InvalidCard(card.id.clone()));
        }
        if !self.pool.can_afford(card.initiative_cost) {
            return Err(RuleViolation::InsufficientInitiative {
                card: card.id.clone(),
                cost: card.initiative_cost,
                available: self.pool.initiative(),
            });
        }
        if let Some(required) = card.momentum_threshold() {
            if self.pool.momentum() < required {
                return Err(RuleViolation::MomentumGate {
                    card: card.id.clone(),
                    required,
                    momentum: self.pool.momentum(),
                });
            }
        }
        Ok(())
    }

    /// Pay the cost and lift the card out of hand. Callers must have run
    /// [`validate_play`](Self::validate_play) first.
    pub(crate) fn take_for_play(&mut self, card: &Card) {
        self.pool.spend_initiative(card.initiative_cost);
        let removed = self.piles.remove_from_hand(&card.id);
        debug_assert!(removed, "take_for_play without validate_play");
    }

    /// Route a resolved card to its post-play pile.
    pub(crate) fn route_resolved(&mut self, card: &Card) {
        match card.persistence {
            Persistence::Echo => self.piles.return_to_deck(card.id.clone()),
            Persistence::Statement => self.piles.exhaust(card.id.clone()),
        }
    }

    /// Discard down to the hand limit.
    ///
    /// `selection` must name exactly `hand_len - 7` held cards; anything
    /// else is rejected without touching the hand.
    pub fn discard_down(&mut self, selection: &[CardId]) -> Result<(), RuleViolation> {
        if !self.piles.over_hand_limit() {
            return Err(RuleViolation::DiscardNotPending);
        }

        let expected = self.piles.discard_down_count();
        if selection.len() != expected {
            return Err(RuleViolation::DiscardCount {
                expected,
                actual: selection.len(),
            });
        }

        // Validate the whole selection against a scratch hand before
        // touching anything, so duplicate ids are counted correctly.
        let mut remaining: Vec<&CardId> = self.piles.hand().iter().collect();
        for card in selection {
            match remaining.iter().position(|held| *held == card) {
                Some(pos) => {
                    remaining.remove(pos);
                }
                None => return Err(RuleViolation::InvalidCard(card.clone())),
            }
        }

        for card in selection {
            self.piles.remove_from_hand(card);
            self.piles.to_discard(card.clone());
        }

        debug_assert!(self.piles.hand().len() <= HAND_LIMIT);
        Ok(())
    }

    /// Capture a serializable snapshot for save/resume.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            npc: self.npc.clone(),
            location: self.location.clone(),
            piles: self.piles.clone(),
            pool: self.pool.clone(),
            turn: self.turn,
            rng: self.rng.state(),
        }
    }

    /// Rebuild a session from a snapshot.
    #[must_use]
    pub fn restore(snapshot: SessionSnapshot) -> Self {
        Self {
            npc: snapshot.npc,
            location: snapshot.location,
            piles: snapshot.piles,
            pool: snapshot.pool,
            turn: snapshot.turn,
            rng: SessionRng::from_state(&snapshot.rng),
        }
    }
}

/// Serializable capture of a full session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub npc: NpcId,
    pub location: LocationId,
    pub piles: CardPiles,
    pub pool: ResourcePool,
    pub turn: u32,
    pub rng: SessionRngState,
}
