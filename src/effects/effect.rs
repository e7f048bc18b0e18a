//! Effect definitions.
//!
//! Effects are the tagged mechanical consequences a card or scene choice
//! carries. The set is closed: one enum, one exhaustive resolver, which is
//! what makes all-or-nothing branch application checkable in one place.
//!
//! Payloads reference world entities by id and carry numbers only — display
//! text is derived by [`describe`](super::describe::describe), never stored.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{
    FactId, LetterId, LocationId, NpcId, ObligationId, ResourceKind, RouteId, TokenKind,
};

/// An ordered list of effects forming one outcome branch.
///
/// Most branches carry one to four effects; `SmallVec` keeps them inline.
pub type EffectList = SmallVec<[Effect; 4]>;

/// One mechanical consequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Conversation resources ===
    /// Adjust a session resource (initiative, momentum, doubt, cadence).
    Resource { kind: ResourceKind, delta: i32 },

    // === Tokens ===
    /// Add to a token balance.
    TokenGain { token: TokenKind, amount: i64 },
    /// Spend from a token balance. Fails the branch if the balance is short.
    TokenSpend { token: TokenKind, amount: i64 },

    // === The delivery queue ===
    /// Move a letter to a new queue position.
    LetterReorder { letter: LetterId, position: usize },
    /// Swap two letters' queue positions.
    LetterSwap { first: LetterId, second: LetterId },
    /// Remove a letter from the queue.
    LetterRemove { letter: LetterId },
    /// Append a letter to the queue.
    LetterAdd { letter: LetterId },
    /// Push a letter's deadline out.
    DeadlineExtend { letter: LetterId, segments: i64 },

    // === Information ===
    /// Learn a fact. Idempotent: re-learning a known fact is a no-op.
    InformationGain { fact: FactId },
    /// Reveal a fact to the player. Idempotent like `InformationGain`.
    InformationReveal { fact: FactId },

    // === World ===
    /// Register a new obligation.
    ObligationCreate { obligation: ObligationId },
    /// Unlock a travel route.
    RouteUnlock { route: RouteId },
    /// Unlock an NPC for interaction.
    NpcUnlock { npc: NpcId },
    /// Unlock an existing locked location.
    LocationUnlock { location: LocationId },
    /// Advance in-game time.
    TimePassage { segments: i64 },
    /// Adjust a per-NPC numeric state value.
    StateChange { npc: NpcId, key: String, delta: i64 },
    /// Open a negotiation with an NPC.
    NegotiationOpen { npc: NpcId },
}

impl Effect {
    /// Initiative delta.
    #[must_use]
    pub fn initiative(delta: i32) -> Self {
        Self::Resource {
            kind: ResourceKind::Initiative,
            delta,
        }
    }

    /// Momentum delta.
    #[must_use]
    pub fn momentum(delta: i32) -> Self {
        Self::Resource {
            kind: ResourceKind::Momentum,
            delta,
        }
    }

    /// Doubt delta.
    #[must_use]
    pub fn doubt(delta: i32) -> Self {
        Self::Resource {
            kind: ResourceKind::Doubt,
            delta,
        }
    }

    /// Cadence delta.
    #[must_use]
    pub fn cadence(delta: i32) -> Self {
        Self::Resource {
            kind: ResourceKind::Cadence,
            delta,
        }
    }

    /// Token gain.
    #[must_use]
    pub fn token_gain(token: impl Into<TokenKind>, amount: i64) -> Self {
        Self::TokenGain {
            token: token.into(),
            amount,
        }
    }

    /// Token spend.
    #[must_use]
    pub fn token_spend(token: impl Into<TokenKind>, amount: i64) -> Self {
        Self::TokenSpend {
            token: token.into(),
            amount,
        }
    }

    /// Fact reveal.
    #[must_use]
    pub fn reveal(fact: impl Into<FactId>) -> Self {
        Self::InformationReveal { fact: fact.into() }
    }

    /// The initiative delta this effect contributes, if any.
    #[must_use]
    pub fn initiative_delta(&self) -> i32 {
        match self {
            Effect::Resource {
                kind: ResourceKind::Initiative,
                delta,
            } => *delta,
            _ => 0,
        }
    }
}

/// Net initiative change across a branch.
#[must_use]
pub fn net_initiative(branch: &[Effect]) -> i32 {
    branch.iter().map(Effect::initiative_delta).sum()
}
