//! Outcome adjudication for played cards.
//!
//! Whether a play lands is decided outside the core: the facade hands the
//! card and session context to an [`OutcomeAdjudicator`] and branches on the
//! answer. The source material does not pin the rule down, so two
//! implementations ship — a deterministic threshold (the default: replays
//! and saves stay exact) and a seeded chance roll — plus a fixed double for
//! tests.

use crate::catalog::Card;
use crate::core::SessionRng;
use crate::session::ConversationSession;

/// Result of adjudicating one play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Decides success or failure for a played card.
pub trait OutcomeAdjudicator {
    fn adjudicate(&mut self, card: &Card, session: &ConversationSession) -> Outcome;
}

/// Deterministic adjudication: a play succeeds when built momentum (plus any
/// positive cadence) carries the card's depth.
///
/// `momentum + max(cadence, 0) >= 2 * depth`. Depth-0 cards always land.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThresholdAdjudicator;

impl OutcomeAdjudicator for ThresholdAdjudicator {
    fn adjudicate(&mut self, card: &Card, session: &ConversationSession) -> Outcome {
        let pool = session.pool();
        let effective = pool.momentum() + pool.cadence().max(0);
        if effective >= 2 * i32::from(card.depth) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Seeded chance roll: deeper cards are riskier, momentum shaves the risk.
///
/// The success probability is `0.9 - 0.15 * depth + 0.02 * momentum`,
/// clamped to `[0.05, 0.95]`.
#[derive(Clone, Debug)]
pub struct ChanceAdjudicator {
    rng: SessionRng,
}

impl ChanceAdjudicator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SessionRng::new(seed),
        }
    }
}

impl OutcomeAdjudicator for ChanceAdjudicator {
    fn adjudicate(&mut self, card: &Card, session: &ConversationSession) -> Outcome {
        let base = 0.9 - 0.15 * f64::from(card.depth) + 0.02 * f64::from(session.pool().momentum());
        let probability = base.clamp(0.05, 0.95);
        if self.rng.gen_bool(probability) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Always returns the configured outcome. Test double.
#[derive(Clone, Copy, Debug)]
pub struct FixedOutcome(pub Outcome);

impl OutcomeAdjudicator for FixedOutcome {
    fn adjudicate(&mut self, _card: &Card, _session: &ConversationSession) -> Outcome {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CardCatalog, CardType, Persistence};
    use crate::core::{CardId, ResourceKind};
    use crate::session::SessionConfig;

    fn session_with_momentum(momentum: i32) -> (CardCatalog, ConversationSession) {
        let catalog = CardCatalog::new(vec![Card::new(
            "probe",
            "Probe",
            CardType::Normal,
            3,
            Persistence::Echo,
            0,
        )])
        .unwrap();
        let config = SessionConfig::new(vec![CardId::new("probe")], 1).with_opening_hand(0);
        let mut session =
            ConversationSession::start("elena", "common_room", config, &catalog).unwrap();
        session.pool_mut().apply(ResourceKind::Momentum, momentum);
        (catalog, session)
    }

    #[test]
    fn test_threshold_rule() {
        let (catalog, session) = session_with_momentum(6);
        let card = catalog.get(&CardId::new("probe")).unwrap();
        let mut adjudicator = ThresholdAdjudicator;

        assert_eq!(adjudicator.adjudicate(card, &session), Outcome::Success);

        let (catalog, session) = session_with_momentum(5);
        let card = catalog.get(&CardId::new("probe")).unwrap();
        assert_eq!(adjudicator.adjudicate(card, &session), Outcome::Failure);
    }

    #[test]
    fn test_chance_is_deterministic_per_seed() {
        let (catalog, session) = session_with_momentum(4);
        let card = catalog.get(&CardId::new("probe")).unwrap();

        let mut a = ChanceAdjudicator::new(7);
        let mut b = ChanceAdjudicator::new(7);
        for _ in 0..20 {
            assert_eq!(
                a.adjudicate(card, &session),
                b.adjudicate(card, &session)
            );
        }
    }

    #[test]
    fn test_fixed_double() {
        let (catalog, session) = session_with_momentum(0);
        let card = catalog.get(&CardId::new("probe")).unwrap();

        let mut fixed = FixedOutcome(Outcome::Success);
        assert_eq!(fixed.adjudicate(card, &session), Outcome::Success);
    }
}
