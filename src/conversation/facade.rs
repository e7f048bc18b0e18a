//! Turn-level conversation orchestration.
//!
//! The facade drives one conversation through its turn state machine:
//!
//! ```text
//! AwaitingCardSelection -> ResolvingOutcome -> ApplyingEffects -+
//!         ^                                                     |
//!         +-----------------------------------------------------+
//!                       (or -> Ended on explicit exit)
//! ```
//!
//! Playing a card asks the adjudication collaborator for an outcome, applies
//! the matching branch atomically through the effect resolver, and routes
//! the card by persistence. Listening is the safety valve: it clears doubt,
//! pays for the relief in momentum and cadence, and refills the hand.
//! Ending is only permitted at a turn boundary, never mid-application.

use std::sync::Arc;

use crate::catalog::CardCatalog;
use crate::core::{
    CardId, ContextEvent, PreconditionFailure, ResourceKind, ResourcePool, RuleViolation,
};
use crate::effects::{describe_branch, EffectDescription, EffectResolver};
use crate::session::ConversationSession;
use crate::world::WorldState;

use super::outcome::{Outcome, OutcomeAdjudicator};

/// Cards drawn by every LISTEN.
pub const LISTEN_BASE_DRAW: usize = 2;

/// Cadence at or above which LISTEN draws one extra card.
pub const LISTEN_CADENCE_BONUS_AT: i32 = 4;

/// Cadence reduction applied by LISTEN.
pub const LISTEN_CADENCE_DROP: i32 = 3;

/// Where the turn state machine currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// Waiting for the player to play, listen, or exit.
    AwaitingCardSelection,
    /// Adjudicating a played card.
    ResolvingOutcome,
    /// Applying the chosen outcome branch.
    ApplyingEffects,
    /// Terminal: the conversation is over.
    Ended,
}

/// What the player did this turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnAction {
    Played { card: CardId, outcome: Outcome },
    Listened { doubt_cleared: i32 },
}

/// The observable result of one turn.
#[derive(Clone, Debug)]
pub struct TurnReport {
    /// Turn number, counting from 1.
    pub turn: u32,
    /// The action taken.
    pub action: TurnAction,
    /// Descriptions of the effects that actually applied, in order.
    pub applied: Vec<EffectDescription>,
    /// Why the branch rolled back, if it did. The card is still played and
    /// its cost is not refunded.
    pub rollback: Option<PreconditionFailure>,
    /// Cards drawn this turn (LISTEN only).
    pub drawn: Vec<CardId>,
    /// Resources after the turn.
    pub pool: ResourcePool,
    /// The hand is over the limit; a discard-down is required.
    pub discard_down_required: bool,
}

/// Pre-commit view of what a card would do.
#[derive(Clone, Debug)]
pub struct CardPreview {
    pub card: CardId,
    pub initiative_cost: i32,
    pub momentum_threshold: Option<i32>,
    pub on_success: Vec<EffectDescription>,
    pub on_failure: Vec<EffectDescription>,
}

/// Summary returned when a conversation ends.
#[derive(Clone, Debug)]
pub struct ConversationSummary {
    pub turns: u32,
    pub pool: ResourcePool,
}

/// Orchestrates one conversation.
pub struct ConversationFacade<A: OutcomeAdjudicator> {
    catalog: Arc<CardCatalog>,
    session: ConversationSession,
    adjudicator: A,
    phase: TurnPhase,
    events: Vec<ContextEvent>,
}

impl<A: OutcomeAdjudicator> ConversationFacade<A> {
    /// Wrap a started session.
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, session: ConversationSession, adjudicator: A) -> Self {
        Self {
            catalog,
            session,
            adjudicator,
            phase: TurnPhase::AwaitingCardSelection,
            events: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The session being orchestrated.
    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Context-change events accumulated since the last drain.
    ///
    /// Every successful play, listen, and discard-down emits one; the scene
    /// state machine consumes them.
    pub fn drain_context_events(&mut self) -> Vec<ContextEvent> {
        std::mem::take(&mut self.events)
    }

    fn guard_active(&self) -> Result<(), RuleViolation> {
        if self.phase == TurnPhase::Ended {
            return Err(RuleViolation::ConversationOver);
        }
        Ok(())
    }

    fn record_context(&mut self) {
        self.events.push(ContextEvent::with_npc(
            self.session.location().clone(),
            self.session.npc().clone(),
        ));
    }

    /// What would this held card do? Mutates nothing.
    pub fn preview(&self, card_id: &CardId) -> Result<CardPreview, RuleViolation> {
        let card = self
            .catalog
            .get(card_id)
            .map_err(|_| RuleViolation::InvalidCard(card_id.clone()))?;

        if !self.session.hand().contains(card_id) {
            return Err(RuleViolation::InvalidCard(card_id.clone()));
        }

        Ok(CardPreview {
            card: card.id.clone(),
            initiative_cost: card.initiative_cost,
            momentum_threshold: card.momentum_threshold(),
            on_success: describe_branch(&card.effects.success),
            on_failure: describe_branch(&card.effects.failure),
        })
    }

    /// Play a card.
    ///
    /// Rule violations are rejected before anything mutates. A branch
    /// precondition failure is not an error at this level: the card is
    /// played, the cost is spent, and the report carries the rollback.
    pub fn play(
        &mut self,
        card_id: &CardId,
        world: &mut dyn WorldState,
    ) -> Result<TurnReport, RuleViolation> {
        self.guard_active()?;

        // The deck was validated at session start, so an id the catalog does
        // not know cannot be in hand either.
        let card = self
            .catalog
            .get(card_id)
            .map_err(|_| RuleViolation::InvalidCard(card_id.clone()))?
            .clone();

        self.session.validate_play(&card)?;

        self.phase = TurnPhase::ResolvingOutcome;
        let outcome = self.adjudicator.adjudicate(&card, &self.session);

        self.phase = TurnPhase::ApplyingEffects;
        self.session.take_for_play(&card);

        let branch = match outcome {
            Outcome::Success => &card.effects.success,
            Outcome::Failure => &card.effects.failure,
        };

        let (applied, rollback) =
            match EffectResolver::apply_branch(branch, self.session.pool_mut(), world) {
                Ok(applied) => (applied, None),
                Err(failure) => (Vec::new(), Some(failure)),
            };

        self.session.route_resolved(&card);

        // One segment of in-game time per conversation turn.
        world.advance_time(1);

        let turn = self.session.next_turn();
        self.record_context();
        self.phase = TurnPhase::AwaitingCardSelection;

        tracing::debug!(
            card = %card.id,
            ?outcome,
            rolled_back = rollback.is_some(),
            "card played"
        );

        Ok(TurnReport {
            turn,
            action: TurnAction::Played {
                card: card.id.clone(),
                outcome,
            },
            applied,
            rollback,
            drawn: Vec::new(),
            pool: self.session.pool().clone(),
            discard_down_required: self.session.discard_down_pending(),
        })
    }

    /// Listen instead of playing a card.
    ///
    /// Clears doubt to zero, reduces momentum by the amount cleared, drops
    /// cadence by three, and draws fresh cards. Never touches initiative and
    /// is legal in any non-terminal state.
    pub fn listen(&mut self, world: &mut dyn WorldState) -> Result<TurnReport, RuleViolation> {
        self.guard_active()?;

        let doubt_cleared = self.session.pool_mut().clear_doubt();
        self.session
            .pool_mut()
            .apply(ResourceKind::Momentum, -doubt_cleared);
        self.session
            .pool_mut()
            .apply(ResourceKind::Cadence, -LISTEN_CADENCE_DROP);

        let mut draw_count = LISTEN_BASE_DRAW;
        if self.session.pool().cadence() >= LISTEN_CADENCE_BONUS_AT {
            draw_count += 1;
        }

        let mut drawn = Vec::with_capacity(draw_count);
        for _ in 0..draw_count {
            match self.session.draw() {
                Some(card) => drawn.push(card),
                None => break,
            }
        }

        world.advance_time(1);

        let turn = self.session.next_turn();
        self.record_context();

        tracing::debug!(doubt_cleared, drawn = drawn.len(), "listened");

        Ok(TurnReport {
            turn,
            action: TurnAction::Listened { doubt_cleared },
            applied: Vec::new(),
            rollback: None,
            drawn,
            pool: self.session.pool().clone(),
            discard_down_required: self.session.discard_down_pending(),
        })
    }

    /// Discard down to the hand limit.
    pub fn discard_down(&mut self, selection: &[CardId]) -> Result<(), RuleViolation> {
        self.guard_active()?;
        self.session.discard_down(selection)?;
        self.record_context();
        Ok(())
    }

    /// End the conversation.
    ///
    /// Only legal at a turn boundary, which is the only place control ever
    /// rests between calls; a second end is rejected.
    pub fn end(&mut self) -> Result<ConversationSummary, RuleViolation> {
        self.guard_active()?;
        debug_assert_eq!(self.phase, TurnPhase::AwaitingCardSelection);

        self.phase = TurnPhase::Ended;
        tracing::info!(npc = %self.session.npc(), turns = self.session.turn(), "conversation ended");

        Ok(ConversationSummary {
            turns: self.session.turn(),
            pool: self.session.pool().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Card, CardType, Persistence};
    use crate::conversation::outcome::FixedOutcome;
    use crate::effects::Effect;
    use crate::session::SessionConfig;
    use crate::world::MemoryWorld;

    fn catalog() -> Arc<CardCatalog> {
        Arc::new(
            CardCatalog::new(vec![
                Card::new("f1", "Foundation", CardType::Normal, 0, Persistence::Echo, 0)
                    .on_success([Effect::initiative(2)])
                    .on_failure([Effect::doubt(1)]),
                Card::new("probe", "Probe", CardType::Normal, 3, Persistence::Echo, 1)
                    .on_success([Effect::momentum(2)])
                    .on_failure([Effect::doubt(2)]),
            ])
            .unwrap(),
        )
    }

    fn facade(deck: &[&str], hand: usize) -> ConversationFacade<FixedOutcome> {
        let catalog = catalog();
        let config = SessionConfig::new(
            deck.iter().map(|n| CardId::new(*n)).collect(),
            42,
        )
        .with_opening_hand(hand);
        let session =
            ConversationSession::start("elena", "common_room", config, &catalog).unwrap();
        ConversationFacade::new(catalog, session, FixedOutcome(Outcome::Success))
    }

    #[test]
    fn test_play_success_applies_branch() {
        let mut facade = facade(&["f1"], 1);
        let mut world = MemoryWorld::new();

        let report = facade.play(&CardId::new("f1"), &mut world).unwrap();

        assert_eq!(report.turn, 1);
        assert!(report.rollback.is_none());
        assert_eq!(report.pool.initiative(), 2);
        assert_eq!(world.now(), 1);
        // Echo card went back to the deck.
        assert_eq!(facade.session().deck_len(), 1);
        assert_eq!(facade.phase(), TurnPhase::AwaitingCardSelection);
    }

    #[test]
    fn test_play_not_in_hand_rejected() {
        let mut facade = facade(&["f1"], 0);
        let mut world = MemoryWorld::new();

        let err = facade.play(&CardId::new("f1"), &mut world).unwrap_err();
        assert_eq!(err, RuleViolation::InvalidCard(CardId::new("f1")));
        assert_eq!(world.now(), 0); // nothing moved
    }

    #[test]
    fn test_listen_scenario() {
        // Doubt=4, Momentum=10, Cadence=8 -> Doubt=0, Momentum=6, Cadence=5.
        let mut facade = facade(&["f1", "f1", "f1"], 0);
        let mut world = MemoryWorld::new();
        facade.session.pool_mut().apply(ResourceKind::Doubt, 4);
        facade.session.pool_mut().apply(ResourceKind::Momentum, 10);
        facade.session.pool_mut().apply(ResourceKind::Cadence, 8);

        let report = facade.listen(&mut world).unwrap();

        assert_eq!(report.action, TurnAction::Listened { doubt_cleared: 4 });
        assert_eq!(report.pool.doubt(), 0);
        assert_eq!(report.pool.momentum(), 6);
        assert_eq!(report.pool.cadence(), 5);
        // Cadence 5 >= 4: bonus draw.
        assert_eq!(report.drawn.len(), 3);
        assert_eq!(report.pool.initiative(), 0); // untouched
    }

    #[test]
    fn test_end_then_act_is_rejected() {
        let mut facade = facade(&["f1"], 1);
        let mut world = MemoryWorld::new();

        let summary = facade.end().unwrap();
        assert_eq!(summary.turns, 0);

        assert_eq!(
            facade.play(&CardId::new("f1"), &mut world).unwrap_err(),
            RuleViolation::ConversationOver
        );
        assert_eq!(
            facade.listen(&mut world).unwrap_err(),
            RuleViolation::ConversationOver
        );
        assert_eq!(facade.end().unwrap_err(), RuleViolation::ConversationOver);
    }

    #[test]
    fn test_preview_mutates_nothing() {
        let facade = facade(&["f1"], 1);

        let preview = facade.preview(&CardId::new("f1")).unwrap();
        assert_eq!(preview.initiative_cost, 0);
        assert_eq!(preview.on_success[0].summary, "+2 initiative");
        assert_eq!(preview.on_failure[0].summary, "+1 doubt");
        assert_eq!(facade.session().hand().len(), 1);
    }

    #[test]
    fn test_context_events_accumulate() {
        let mut facade = facade(&["f1", "f1"], 2);
        let mut world = MemoryWorld::new();

        facade.play(&CardId::new("f1"), &mut world).unwrap();
        facade.listen(&mut world).unwrap();

        let events = facade.drain_context_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ContextEvent::with_npc("common_room", "elena"));
        assert!(facade.drain_context_events().is_empty());
    }
}
