//! Identifier newtypes for content and world entities.
//!
//! Every id the engine handles is a string defined by content (card files,
//! scene scripts, world data). Wrapping each in its own newtype keeps a
//! `LetterId` from ever being passed where an `NpcId` is expected; effect
//! payloads reference entities only through these types, never free text.
//!
//! ## Usage
//!
//! ```
//! use parlance::core::{CardId, LocationId};
//!
//! let card = CardId::new("foundation_greeting");
//! assert_eq!(card.as_str(), "foundation_greeting");
//!
//! let generated = LocationId::new("generated:private_room");
//! assert_eq!(format!("{}", generated), "generated:private_room");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Identifies a card definition in the catalog.
    CardId
}

define_id! {
    /// Identifies an NPC in the world.
    NpcId
}

define_id! {
    /// Identifies a location, fixed or generated.
    LocationId
}

define_id! {
    /// Identifies a letter in the player's delivery queue.
    LetterId
}

define_id! {
    /// Identifies an inventory item.
    ItemId
}

define_id! {
    /// Identifies a travel route.
    RouteId
}

define_id! {
    /// Identifies a revealable fact.
    FactId
}

define_id! {
    /// Identifies a delivery obligation.
    ObligationId
}

define_id! {
    /// Identifies a scene script.
    SceneId
}

define_id! {
    /// Identifies a token currency (trust, favor, ...).
    TokenKind
}
