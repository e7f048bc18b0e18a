//! Save/resume capture.
//!
//! A save captures exactly what resuming needs: the active session (hand,
//! deck order, discard and exhausted piles, pool, RNG position) and every
//! scene's situation index plus transient ledger. Scene scripts and the
//! card catalog are content, re-supplied at restore time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::SceneSnapshot;
use crate::session::SessionSnapshot;

/// Encoding/decoding failures for save blobs.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save encoding failed: {0}")]
    Encode(String),
    #[error("save decoding failed: {0}")]
    Decode(String),
}

/// Everything persisted for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    /// The active conversation, if one is in flight.
    pub session: Option<SessionSnapshot>,
    /// All scene instances, terminal ones included.
    pub scenes: Vec<SceneSnapshot>,
}

impl SaveState {
    /// Encode as a compact binary blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        bincode::serialize(self).map_err(|err| SaveError::Encode(err.to_string()))
    }

    /// Decode from a binary blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaveError> {
        bincode::deserialize(bytes).map_err(|err| SaveError::Decode(err.to_string()))
    }

    /// Encode as JSON, for inspection and fixtures.
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|err| SaveError::Encode(err.to_string()))
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        serde_json::from_str(json).map_err(|err| SaveError::Decode(err.to_string()))
    }
}
