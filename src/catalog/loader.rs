//! Card definition file loading.
//!
//! The content collaborator ships card definitions as JSON. Each effect
//! entry is a single-key object mapping an effect kind to its payload:
//!
//! ```json
//! {
//!   "cards": [
//!     {
//!       "id": "foundation_greeting",
//!       "name": "Warm Greeting",
//!       "type": "normal",
//!       "depth": 0,
//!       "persistence": "echo",
//!       "initiativeCost": 0,
//!       "effects": {
//!         "success": [ { "initiative": 2 } ],
//!         "failure": [ { "doubt": 1 } ]
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Unknown keys, malformed payloads, duplicate ids, and invariant violations
//! are all `ContentError` — fatal at load, by design never mid-session.

use serde::Deserialize;

use crate::core::{CardId, ContentError};
use crate::effects::Effect;

use super::card::{Card, CardType, OutcomeBranches, Persistence};
use super::catalog::CardCatalog;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CardFile {
    cards: Vec<CardDef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CardDef {
    id: String,
    name: String,
    #[serde(rename = "type")]
    card_type: CardType,
    depth: u8,
    persistence: Persistence,
    #[serde(default)]
    initiative_cost: i32,
    #[serde(default)]
    effects: BranchesDef,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BranchesDef {
    #[serde(default)]
    success: Vec<EffectDef>,
    #[serde(default)]
    failure: Vec<EffectDef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum EffectDef {
    Initiative(i32),
    Momentum(i32),
    Doubt(i32),
    Cadence(i32),
    TokenGain { token: String, amount: i64 },
    TokenSpend { token: String, amount: i64 },
    LetterReorder { letter: String, position: usize },
    LetterSwap { first: String, second: String },
    LetterRemove(String),
    LetterAdd(String),
    DeadlineExtend { letter: String, segments: i64 },
    InformationGain(String),
    InformationReveal(String),
    ObligationCreate(String),
    RouteUnlock(String),
    NpcUnlock(String),
    LocationUnlock(String),
    TimePassage(i64),
    StateChange { npc: String, key: String, delta: i64 },
    NegotiationOpen(String),
}

/// Load and validate a catalog from JSON.
pub fn load_catalog(json: &str) -> Result<CardCatalog, ContentError> {
    let file: CardFile =
        serde_json::from_str(json).map_err(|err| ContentError::Parse(err.to_string()))?;

    let cards = file
        .cards
        .into_iter()
        .map(convert_card)
        .collect::<Result<Vec<_>, _>>()?;

    CardCatalog::new(cards)
}

fn convert_card(def: CardDef) -> Result<Card, ContentError> {
    let id = CardId::new(def.id);

    let success = convert_branch(&id, def.effects.success)?;
    let failure = convert_branch(&id, def.effects.failure)?;

    Ok(Card {
        id,
        name: def.name,
        card_type: def.card_type,
        depth: def.depth,
        persistence: def.persistence,
        initiative_cost: def.initiative_cost,
        effects: OutcomeBranches { success, failure },
    })
}

fn convert_branch(
    card: &CardId,
    defs: Vec<EffectDef>,
) -> Result<crate::effects::EffectList, ContentError> {
    defs.into_iter()
        .map(|def| convert_effect(card, def))
        .collect()
}

fn positive(card: &CardId, field: &str, value: i64) -> Result<i64, ContentError> {
    if value <= 0 {
        return Err(ContentError::InvalidCard {
            card: card.clone(),
            reason: format!("{field} must be positive, got {value}"),
        });
    }
    Ok(value)
}

fn convert_effect(card: &CardId, def: EffectDef) -> Result<Effect, ContentError> {
    Ok(match def {
        EffectDef::Initiative(delta) => Effect::initiative(delta),
        EffectDef::Momentum(delta) => Effect::momentum(delta),
        EffectDef::Doubt(delta) => Effect::doubt(delta),
        EffectDef::Cadence(delta) => Effect::cadence(delta),
        EffectDef::TokenGain { token, amount } => Effect::TokenGain {
            token: token.into(),
            amount: positive(card, "tokenGain amount", amount)?,
        },
        EffectDef::TokenSpend { token, amount } => Effect::TokenSpend {
            token: token.into(),
            amount: positive(card, "tokenSpend amount", amount)?,
        },
        EffectDef::LetterReorder { letter, position } => Effect::LetterReorder {
            letter: letter.into(),
            position,
        },
        EffectDef::LetterSwap { first, second } => Effect::LetterSwap {
            first: first.into(),
            second: second.into(),
        },
        EffectDef::LetterRemove(letter) => Effect::LetterRemove {
            letter: letter.into(),
        },
        EffectDef::LetterAdd(letter) => Effect::LetterAdd {
            letter: letter.into(),
        },
        EffectDef::DeadlineExtend { letter, segments } => Effect::DeadlineExtend {
            letter: letter.into(),
            segments: positive(card, "deadlineExtend segments", segments)?,
        },
        EffectDef::InformationGain(fact) => Effect::InformationGain { fact: fact.into() },
        EffectDef::InformationReveal(fact) => Effect::InformationReveal { fact: fact.into() },
        EffectDef::ObligationCreate(obligation) => Effect::ObligationCreate {
            obligation: obligation.into(),
        },
        EffectDef::RouteUnlock(route) => Effect::RouteUnlock {
            route: route.into(),
        },
        EffectDef::NpcUnlock(npc) => Effect::NpcUnlock { npc: npc.into() },
        EffectDef::LocationUnlock(location) => Effect::LocationUnlock {
            location: location.into(),
        },
        EffectDef::TimePassage(segments) => Effect::TimePassage {
            segments: positive(card, "timePassage segments", segments)?,
        },
        EffectDef::StateChange { npc, key, delta } => Effect::StateChange {
            npc: npc.into(),
            key,
            delta,
        },
        EffectDef::NegotiationOpen(npc) => Effect::NegotiationOpen { npc: npc.into() },
    })
}
