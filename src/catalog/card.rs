//! Card definitions - static card data.
//!
//! A `Card` holds the immutable properties of one conversation card: its
//! cost, depth tier, persistence, and the effect branches for each outcome.
//! Session-specific placement (deck, hand, discard) is tracked by the
//! session, never here.

use serde::{Deserialize, Serialize};

use crate::core::CardId;
use crate::effects::{net_initiative, EffectList};

/// Depth at or below which a zero-cost card counts as a Foundation card.
pub const FOUNDATION_DEPTH: u8 = 2;

/// Conversational role of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Asks something of the partner; gated on momentum.
    Request,
    /// Commits the player to something.
    Promise,
    /// Trades one thing for another.
    Exchange,
    /// Everything else.
    Normal,
}

/// What happens to a card after it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Returns to the deck; playable again later in the session.
    Echo,
    /// Consumed for the rest of the session.
    Statement,
}

/// The two outcome branches of a card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBranches {
    pub success: EffectList,
    pub failure: EffectList,
}

/// Immutable card definition, owned by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,

    /// Display label.
    pub name: String,

    /// Conversational role.
    pub card_type: CardType,

    /// Depth tier, 0 = surface small talk.
    pub depth: u8,

    /// Echo or Statement.
    pub persistence: Persistence,

    /// Initiative cost to play.
    pub initiative_cost: i32,

    /// Success and failure branches.
    pub effects: OutcomeBranches,
}

impl Card {
    /// Create a card with empty branches.
    #[must_use]
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        card_type: CardType,
        depth: u8,
        persistence: Persistence,
        initiative_cost: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_type,
            depth,
            persistence,
            initiative_cost,
            effects: OutcomeBranches::default(),
        }
    }

    /// Set the success branch (builder pattern).
    #[must_use]
    pub fn on_success(mut self, effects: impl IntoIterator<Item = crate::effects::Effect>) -> Self {
        self.effects.success = effects.into_iter().collect();
        self
    }

    /// Set the failure branch (builder pattern).
    #[must_use]
    pub fn on_failure(mut self, effects: impl IntoIterator<Item = crate::effects::Effect>) -> Self {
        self.effects.failure = effects.into_iter().collect();
        self
    }

    /// Net initiative change of the success branch.
    #[must_use]
    pub fn success_initiative(&self) -> i32 {
        net_initiative(&self.effects.success)
    }

    /// A Foundation card: low depth, free to play, the sustainable base of
    /// the conversation economy.
    #[must_use]
    pub fn is_foundation(&self) -> bool {
        self.depth <= FOUNDATION_DEPTH && self.initiative_cost == 0
    }

    /// Momentum required before a Request card may be played.
    ///
    /// Thresholds step with depth tier: basic 8, enhanced 12, premium 16.
    #[must_use]
    pub fn momentum_threshold(&self) -> Option<i32> {
        if self.card_type != CardType::Request {
            return None;
        }
        Some(match self.depth {
            0 | 1 => 8,
            2 => 12,
            _ => 16,
        })
    }
}
