//! Save/resume integration tests.
//!
//! A save taken mid-conversation and mid-scene must restore to a state that
//! behaves identically, deck order and all.

use std::sync::Arc;

use parlance::{
    Card, CardCatalog, CardId, CardType, ContextEvent, ConversationFacade, ConversationSession,
    Effect, FixedOutcome, MemoryWorld, Outcome, Persistence, SaveState, SceneDirector, SceneId,
    SceneScript, SceneState, SessionConfig, Situation, SituationChoice,
};

fn catalog() -> Arc<CardCatalog> {
    Arc::new(
        CardCatalog::new(vec![
            Card::new("f1", "Open Up", CardType::Normal, 0, Persistence::Echo, 0)
                .on_success([Effect::initiative(2)]),
            Card::new("aside", "Quiet Aside", CardType::Normal, 1, Persistence::Statement, 0)
                .on_success([Effect::momentum(1)]),
        ])
        .unwrap(),
    )
}

fn errand_script() -> Arc<SceneScript> {
    SceneScript::new(
        "errand",
        vec![
            Situation::at("market").with_choice(SituationChoice::new("Accept")),
            Situation::at("docks").with_choice(SituationChoice::new("Deliver")),
        ],
    )
}

/// Mid-flight capture restores a session that draws the same cards and a
/// director that resumes the same situation.
#[test]
fn test_save_and_resume_mid_flight() {
    let catalog = catalog();
    let mut world = MemoryWorld::new()
        .with_npc("elena", "common_room")
        .with_location("market")
        .with_location("docks");

    // Drive a conversation a few turns in.
    let config = SessionConfig::new(
        vec![
            CardId::new("f1"),
            CardId::new("f1"),
            CardId::new("aside"),
            CardId::new("f1"),
            CardId::new("aside"),
        ],
        1234,
    )
    .with_opening_hand(3);
    let session = ConversationSession::start("elena", "common_room", config, &catalog).unwrap();
    let mut facade =
        ConversationFacade::new(catalog.clone(), session, FixedOutcome(Outcome::Success));

    let first_in_hand = facade.session().hand()[0].clone();
    facade.play(&first_in_hand, &mut world).unwrap();
    facade.listen(&mut world).unwrap();

    // Advance a scene past its first situation.
    let mut director = SceneDirector::new();
    director.register(errand_script()).unwrap();
    director.trigger(&SceneId::new("errand")).unwrap();
    director.observe(&ContextEvent::at("market"), &mut world);
    let mut pool = facade.session().pool().clone();
    director
        .choose(&SceneId::new("errand"), 0, &mut pool, &mut world)
        .unwrap();

    // Capture, encode, decode.
    let save = SaveState {
        session: Some(facade.session().snapshot()),
        scenes: director.snapshot(),
    };
    let bytes = save.to_bytes().unwrap();
    let restored_save = SaveState::from_bytes(&bytes).unwrap();
    assert_eq!(save, restored_save);

    // The restored session continues with the identical deck order.
    let mut original_session = ConversationSession::restore(save.session.clone().unwrap());
    let mut restored_session =
        ConversationSession::restore(restored_save.session.unwrap());

    assert_eq!(original_session.hand(), restored_session.hand());
    assert_eq!(original_session.pool(), restored_session.pool());
    assert_eq!(original_session.turn(), restored_session.turn());
    loop {
        let a = original_session.draw();
        let b = restored_session.draw();
        assert_eq!(a, b, "restored deck order diverged");
        if a.is_none() {
            break;
        }
    }

    // The restored director resumes the same situation index.
    let mut restored_director =
        SceneDirector::restore(restored_save.scenes, &[errand_script()]).unwrap();
    assert_eq!(
        restored_director.state(&SceneId::new("errand")).unwrap(),
        SceneState::AwaitingSituation(1)
    );
    let report = restored_director.observe(&ContextEvent::at("docks"), &mut world);
    assert_eq!(report.engaged, vec![SceneId::new("errand")]);
}

/// A save with no active conversation is a plain free-roam capture.
#[test]
fn test_free_roam_save_has_no_session() {
    let mut director = SceneDirector::new();
    director.register(errand_script()).unwrap();

    let save = SaveState {
        session: None,
        scenes: director.snapshot(),
    };

    let json = save.to_json().unwrap();
    let back = SaveState::from_json(&json).unwrap();

    assert_eq!(back.session, None);
    assert_eq!(back.scenes.len(), 1);
    assert_eq!(back.scenes[0].state, SceneState::NotStarted);
}
