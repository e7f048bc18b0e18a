//! Structured effect descriptions.
//!
//! A pure mapping from effect variant to a description record. Mechanical
//! truth lives in the [`Effect`] payload; this module derives the player-
//! facing summary from it, so the two can never drift apart. The facade uses
//! these records for pre-commit previews of a card's branches.

use serde::{Deserialize, Serialize};

use super::effect::Effect;

/// Broad grouping used by presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCategory {
    Resource,
    Token,
    Letter,
    Information,
    World,
    Time,
}

/// Derived description of a single effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescription {
    /// Presentation grouping.
    pub category: EffectCategory,
    /// The entity the effect touches, if any.
    pub target: Option<String>,
    /// Signed magnitude, if the effect is numeric.
    pub magnitude: Option<i64>,
    /// One-line summary.
    pub summary: String,
}

fn signed(delta: i64) -> String {
    if delta >= 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

/// Describe one effect.
#[must_use]
pub fn describe(effect: &Effect) -> EffectDescription {
    match effect {
        Effect::Resource { kind, delta } => EffectDescription {
            category: EffectCategory::Resource,
            target: None,
            magnitude: Some(i64::from(*delta)),
            summary: format!("{} {}", signed(i64::from(*delta)), kind),
        },
        Effect::TokenGain { token, amount } => EffectDescription {
            category: EffectCategory::Token,
            target: Some(token.to_string()),
            magnitude: Some(*amount),
            summary: format!("gain {amount} {token}"),
        },
        Effect::TokenSpend { token, amount } => EffectDescription {
            category: EffectCategory::Token,
            target: Some(token.to_string()),
            magnitude: Some(-amount),
            summary: format!("spend {amount} {token}"),
        },
        Effect::LetterReorder { letter, position } => EffectDescription {
            category: EffectCategory::Letter,
            target: Some(letter.to_string()),
            magnitude: Some(*position as i64),
            summary: format!("move {letter} to position {position}"),
        },
        Effect::LetterSwap { first, second } => EffectDescription {
            category: EffectCategory::Letter,
            target: Some(first.to_string()),
            magnitude: None,
            summary: format!("swap {first} with {second}"),
        },
        Effect::LetterRemove { letter } => EffectDescription {
            category: EffectCategory::Letter,
            target: Some(letter.to_string()),
            magnitude: None,
            summary: format!("remove {letter} from the queue"),
        },
        Effect::LetterAdd { letter } => EffectDescription {
            category: EffectCategory::Letter,
            target: Some(letter.to_string()),
            magnitude: None,
            summary: format!("add {letter} to the queue"),
        },
        Effect::DeadlineExtend { letter, segments } => EffectDescription {
            category: EffectCategory::Letter,
            target: Some(letter.to_string()),
            magnitude: Some(*segments),
            summary: format!("extend {letter} deadline by {segments}"),
        },
        Effect::InformationGain { fact } => EffectDescription {
            category: EffectCategory::Information,
            target: Some(fact.to_string()),
            magnitude: None,
            summary: format!("learn {fact}"),
        },
        Effect::InformationReveal { fact } => EffectDescription {
            category: EffectCategory::Information,
            target: Some(fact.to_string()),
            magnitude: None,
            summary: format!("reveal {fact}"),
        },
        Effect::ObligationCreate { obligation } => EffectDescription {
            category: EffectCategory::World,
            target: Some(obligation.to_string()),
            magnitude: None,
            summary: format!("take on {obligation}"),
        },
        Effect::RouteUnlock { route } => EffectDescription {
            category: EffectCategory::World,
            target: Some(route.to_string()),
            magnitude: None,
            summary: format!("unlock route {route}"),
        },
        Effect::NpcUnlock { npc } => EffectDescription {
            category: EffectCategory::World,
            target: Some(npc.to_string()),
            magnitude: None,
            summary: format!("unlock {npc}"),
        },
        Effect::LocationUnlock { location } => EffectDescription {
            category: EffectCategory::World,
            target: Some(location.to_string()),
            magnitude: None,
            summary: format!("unlock {location}"),
        },
        Effect::TimePassage { segments } => EffectDescription {
            category: EffectCategory::Time,
            target: None,
            magnitude: Some(*segments),
            summary: format!("{segments} segments pass"),
        },
        Effect::StateChange { npc, key, delta } => EffectDescription {
            category: EffectCategory::World,
            target: Some(npc.to_string()),
            magnitude: Some(*delta),
            summary: format!("{} {} for {npc}", signed(*delta), key),
        },
        Effect::NegotiationOpen { npc } => EffectDescription {
            category: EffectCategory::World,
            target: Some(npc.to_string()),
            magnitude: None,
            summary: format!("open negotiation with {npc}"),
        },
    }
}

/// Describe every effect in a branch, in order.
#[must_use]
pub fn describe_branch(branch: &[Effect]) -> Vec<EffectDescription> {
    branch.iter().map(describe).collect()
}
