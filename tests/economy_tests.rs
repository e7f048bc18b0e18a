//! Property tests for the conversation card economy.
//!
//! The deck/hand/discard/exhausted invariants have to hold under arbitrary
//! play sequences, not just the happy paths the scenario tests walk.

use std::sync::Arc;

use proptest::prelude::*;

use parlance::{
    Card, CardCatalog, CardId, CardType, ContentError, ConversationFacade, ConversationSession,
    Effect, FixedOutcome, MemoryWorld, Outcome, Persistence, SessionConfig, HAND_LIMIT,
};

fn two_card_catalog() -> Arc<CardCatalog> {
    Arc::new(
        CardCatalog::new(vec![
            Card::new("echo", "Echo", CardType::Normal, 0, Persistence::Echo, 0),
            Card::new(
                "statement",
                "Statement",
                CardType::Normal,
                0,
                Persistence::Statement,
                0,
            ),
        ])
        .unwrap(),
    )
}

/// One step of an arbitrary session workout.
#[derive(Clone, Copy, Debug)]
enum Step {
    Listen,
    PlayFirst,
    DiscardDown,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Listen),
        Just(Step::PlayFirst),
        Just(Step::DiscardDown),
    ]
}

proptest! {
    /// Card conservation: every card stays in exactly one pile, consumed
    /// Statements never resurface, drawing never stalls while cards remain,
    /// and the hand limit is restorable at any point.
    #[test]
    fn card_conservation_under_arbitrary_play(
        echoes in 0_usize..8,
        statements in 0_usize..8,
        seed in 0_u64..1_000,
        steps in proptest::collection::vec(step_strategy(), 1..60),
    ) {
        let catalog = two_card_catalog();
        let mut deck: Vec<CardId> = Vec::new();
        deck.extend(std::iter::repeat(CardId::new("echo")).take(echoes));
        deck.extend(std::iter::repeat(CardId::new("statement")).take(statements));
        let total = deck.len();

        let config = SessionConfig::new(deck, seed).with_opening_hand(0);
        let session =
            ConversationSession::start("elena", "common_room", config, &catalog).unwrap();
        let mut facade =
            ConversationFacade::new(catalog.clone(), session, FixedOutcome(Outcome::Success));
        let mut world = MemoryWorld::new();

        let mut statements_consumed = 0_usize;

        for step in steps {
            match step {
                Step::Listen => {
                    let before_available =
                        facade.session().deck_len() + facade.session().discard_len();
                    let report = facade.listen(&mut world).unwrap();
                    // Drawing stalls only when nothing is left anywhere.
                    prop_assert_eq!(report.drawn.is_empty(), before_available == 0);
                }
                Step::PlayFirst => {
                    if facade.session().discard_down_pending() {
                        continue;
                    }
                    let Some(card_id) = facade.session().hand().first().cloned() else {
                        continue;
                    };
                    facade.play(&card_id, &mut world).unwrap();
                    if catalog.get(&card_id).unwrap().persistence == Persistence::Statement {
                        statements_consumed += 1;
                    }
                }
                Step::DiscardDown => {
                    if !facade.session().discard_down_pending() {
                        continue;
                    }
                    let excess = facade.session().hand().len() - HAND_LIMIT;
                    let selection: Vec<CardId> = facade.session().hand()[..excess].to_vec();
                    facade.discard_down(&selection).unwrap();
                    prop_assert!(facade.session().hand().len() <= HAND_LIMIT);
                }
            }

            // Conservation: all copies are accounted for.
            let everywhere = facade.session().deck_len()
                + facade.session().hand().len()
                + facade.session().discard_len()
                + facade.session().exhausted_len();
            prop_assert_eq!(everywhere, total);

            // Exhausted matches consumed Statements exactly.
            prop_assert_eq!(facade.session().exhausted_len(), statements_consumed);
        }
    }

    /// The renewable-generator invariant: a catalog admits a card set iff
    /// no Statement card nets positive initiative on success.
    #[test]
    fn echo_invariant_decides_catalog_admission(
        gain in -3_i32..=3,
        is_echo in any::<bool>(),
    ) {
        let persistence = if is_echo { Persistence::Echo } else { Persistence::Statement };
        let card = Card::new("c", "C", CardType::Normal, 0, persistence, 0)
            .on_success([Effect::initiative(gain)]);

        let result = CardCatalog::new(vec![card]);
        let violates = gain > 0 && !is_echo;

        if violates {
            prop_assert_eq!(
                result.unwrap_err(),
                ContentError::NonRenewableGenerator(CardId::new("c"))
            );
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Seeded sessions are fully deterministic: identical configs draw the
    /// identical sequence.
    #[test]
    fn identical_seeds_draw_identically(
        seed in 0_u64..10_000,
        cards in 1_usize..12,
    ) {
        let catalog = two_card_catalog();
        let deck: Vec<CardId> = (0..cards)
            .map(|i| {
                if i % 2 == 0 {
                    CardId::new("echo")
                } else {
                    CardId::new("statement")
                }
            })
            .collect();

        let mut a = ConversationSession::start(
            "elena",
            "common_room",
            SessionConfig::new(deck.clone(), seed).with_opening_hand(0),
            &catalog,
        )
        .unwrap();
        let mut b = ConversationSession::start(
            "elena",
            "common_room",
            SessionConfig::new(deck, seed).with_opening_hand(0),
            &catalog,
        )
        .unwrap();

        loop {
            let x = a.draw();
            let y = b.draw();
            prop_assert_eq!(&x, &y);
            if x.is_none() {
                break;
            }
        }
    }
}
