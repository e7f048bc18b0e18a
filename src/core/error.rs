//! Error types, one enum per failure class.
//!
//! - [`ContentError`]: malformed or missing catalog content. Fatal at boot;
//!   never recoverable mid-session.
//! - [`RuleViolation`]: an illegal player action, rejected at the boundary
//!   with no state mutation.
//! - [`PreconditionFailure`]: an effect branch could not be applied; the
//!   whole branch rolled back.
//! - [`SceneError`]: scene bookkeeping failures, including consistency loss
//!   that forces abandonment.
//! - [`WorldError`]: reported by the world-state collaborator; the effect
//!   engine maps these into precondition failures.

use thiserror::Error;

use super::ids::{
    CardId, ItemId, LetterId, LocationId, NpcId, ObligationId, RouteId, SceneId, TokenKind,
};

/// Malformed or missing catalog content. Fatal at load.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("card `{0}` defined more than once")]
    DuplicateCard(CardId),

    #[error("card `{0}` is not in the catalog")]
    UnknownCard(CardId),

    #[error("card `{card}`: {reason}")]
    InvalidCard { card: CardId, reason: String },

    #[error("card `{0}` generates initiative on success but is not Echo")]
    NonRenewableGenerator(CardId),

    #[error("card definition file is not valid JSON: {0}")]
    Parse(String),
}

/// An illegal player action. Rejected before any state changes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("card `{0}` is not in hand")]
    InvalidCard(CardId),

    #[error("card `{card}` costs {cost} initiative but only {available} is available")]
    InsufficientInitiative {
        card: CardId,
        cost: i32,
        available: i32,
    },

    #[error("request card `{card}` needs momentum {required}, currently {momentum}")]
    MomentumGate {
        card: CardId,
        required: i32,
        momentum: i32,
    },

    #[error("discard-down must select exactly {expected} cards, got {actual}")]
    DiscardCount { expected: usize, actual: usize },

    #[error("hand is within limit; there is nothing to discard down")]
    DiscardNotPending,

    #[error("hand is over the limit; discard down before acting")]
    DiscardPending,

    #[error("the conversation has ended")]
    ConversationOver,
}

/// Why an effect branch rolled back.
///
/// The player-visible result is "no mechanical change"; the card that
/// carried the branch is still considered played.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("spend of {requested} `{token}` exceeds balance {available}")]
    TokenBalance {
        token: TokenKind,
        requested: i64,
        available: i64,
    },

    #[error("letter `{0}` is not in the delivery queue")]
    MissingLetter(LetterId),

    #[error("npc `{0}` does not exist")]
    MissingNpc(NpcId),

    #[error("location `{0}` does not exist")]
    MissingLocation(LocationId),

    #[error("item `{0}` is not held")]
    MissingItem(ItemId),

    #[error("route `{0}` is already unlocked")]
    RouteAlreadyUnlocked(RouteId),

    #[error("npc `{0}` is already unlocked")]
    NpcAlreadyUnlocked(NpcId),

    #[error("location `{0}` is already unlocked")]
    LocationAlreadyUnlocked(LocationId),

    #[error("obligation `{0}` already exists")]
    ObligationExists(ObligationId),

    #[error("a negotiation with `{0}` is already open")]
    NegotiationAlreadyOpen(NpcId),

    #[error("letter position {position} is out of range for a queue of {len}")]
    LetterPosition { position: usize, len: usize },
}

/// Scene state machine failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("no scene instance `{0}`")]
    UnknownScene(SceneId),

    #[error("scene `{0}` is already registered")]
    AlreadyRegistered(SceneId),

    #[error("scene `{0}` is not in a state it can be triggered from")]
    NotTriggerable(SceneId),

    #[error("scene `{0}` has no active situation in the current context")]
    NotEngaged(SceneId),

    #[error("scene `{scene}` has no choice {index} in its active situation")]
    UnknownChoice { scene: SceneId, index: usize },

    #[error("scene `{scene}` lost its resumption context: npc `{npc}` no longer exists")]
    ConsistencyLost { scene: SceneId, npc: NpcId },

    #[error("scene `{scene}` could not claim transient resource `{resource}`")]
    TransientClaimed { scene: SceneId, resource: String },

    #[error(transparent)]
    Choice(#[from] PreconditionFailure),
}

/// Failures reported by the world-state collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("npc `{0}` not found")]
    NpcNotFound(NpcId),

    #[error("location `{0}` not found")]
    LocationNotFound(LocationId),

    #[error("letter `{0}` not found")]
    LetterNotFound(LetterId),

    #[error("item `{0}` not found")]
    ItemNotFound(ItemId),

    #[error("location `{0}` already exists")]
    LocationExists(LocationId),
}

impl From<WorldError> for PreconditionFailure {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::NpcNotFound(npc) => PreconditionFailure::MissingNpc(npc),
            WorldError::LocationNotFound(loc) | WorldError::LocationExists(loc) => {
                PreconditionFailure::MissingLocation(loc)
            }
            WorldError::LetterNotFound(letter) => PreconditionFailure::MissingLetter(letter),
            WorldError::ItemNotFound(item) => PreconditionFailure::MissingItem(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = RuleViolation::InsufficientInitiative {
            card: CardId::new("deep_question"),
            cost: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "card `deep_question` costs 3 initiative but only 1 is available"
        );
    }

    #[test]
    fn test_world_error_maps_to_precondition() {
        let err = WorldError::NpcNotFound(NpcId::new("elena"));
        let failure: PreconditionFailure = err.into();
        assert_eq!(failure, PreconditionFailure::MissingNpc(NpcId::new("elena")));
    }

    #[test]
    fn test_precondition_wraps_into_scene_error() {
        let failure = PreconditionFailure::MissingLocation(LocationId::new("cellar"));
        let err: SceneError = failure.clone().into();
        assert_eq!(err, SceneError::Choice(failure));
    }
}
