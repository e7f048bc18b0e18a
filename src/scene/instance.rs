//! Runtime state of one scene.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::SceneId;

use super::script::{SceneScript, Situation, TransientResource};

/// Lifecycle of a scene instance.
///
/// The situation index only ever moves forward; there is no transition back
/// from `Completed` or `Abandoned`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneState {
    /// Registered but not yet triggered.
    NotStarted,
    /// Waiting for situation `n`'s resumption predicate to match.
    AwaitingSituation(usize),
    /// Every situation completed; transients torn down.
    Completed,
    /// Cancelled or context permanently lost; transients torn down.
    Abandoned,
}

/// One scene's runtime progress, persisted across free-roam play.
#[derive(Clone, Debug)]
pub struct SceneInstance {
    script: Arc<SceneScript>,
    state: SceneState,
    transients: Vec<TransientResource>,
}

impl SceneInstance {
    /// Wrap a script, not yet triggered.
    #[must_use]
    pub fn new(script: Arc<SceneScript>) -> Self {
        Self {
            script,
            state: SceneState::NotStarted,
            transients: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &SceneId {
        &self.script.id
    }

    #[must_use]
    pub fn state(&self) -> SceneState {
        self.state
    }

    #[must_use]
    pub fn script(&self) -> &SceneScript {
        &self.script
    }

    /// The situation currently awaited, if any.
    #[must_use]
    pub fn current_situation(&self) -> Option<&Situation> {
        match self.state {
            SceneState::AwaitingSituation(index) => self.script.situations.get(index),
            _ => None,
        }
    }

    /// Index of the awaited situation, if any.
    #[must_use]
    pub fn situation_index(&self) -> Option<usize> {
        match self.state {
            SceneState::AwaitingSituation(index) => Some(index),
            _ => None,
        }
    }

    /// Transients created so far and not yet torn down.
    #[must_use]
    pub fn transients(&self) -> &[TransientResource] {
        &self.transients
    }

    pub(super) fn set_state(&mut self, state: SceneState) {
        if let (SceneState::AwaitingSituation(from), SceneState::AwaitingSituation(to)) =
            (self.state, state)
        {
            debug_assert!(to > from, "situation index must not decrease");
        }
        self.state = state;
    }

    pub(super) fn ledger(&mut self, resource: TransientResource) {
        self.transients.push(resource);
    }

    pub(super) fn take_transients(&mut self) -> Vec<TransientResource> {
        std::mem::take(&mut self.transients)
    }

    /// Serializable capture of this instance.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            scene: self.script.id.clone(),
            state: self.state,
            transients: self.transients.clone(),
        }
    }

    /// Rebuild from a snapshot and its script.
    ///
    /// The script must be the one the snapshot was taken against; scripts
    /// are content and are not serialized with save state.
    #[must_use]
    pub fn restore(snapshot: SceneSnapshot, script: Arc<SceneScript>) -> Self {
        debug_assert_eq!(snapshot.scene, script.id);
        Self {
            script,
            state: snapshot.state,
            transients: snapshot.transients,
        }
    }
}

/// Serializable capture of one scene instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub scene: SceneId,
    pub state: SceneState,
    pub transients: Vec<TransientResource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::script::Situation;

    fn script() -> Arc<SceneScript> {
        SceneScript::new(
            "delivery_errand",
            vec![Situation::at("common_room"), Situation::at("docks")],
        )
    }

    #[test]
    fn test_initial_state() {
        let instance = SceneInstance::new(script());
        assert_eq!(instance.state(), SceneState::NotStarted);
        assert!(instance.current_situation().is_none());
        assert!(instance.transients().is_empty());
    }

    #[test]
    fn test_current_situation_tracks_index() {
        let mut instance = SceneInstance::new(script());
        instance.set_state(SceneState::AwaitingSituation(1));

        assert_eq!(instance.situation_index(), Some(1));
        let situation = instance.current_situation().unwrap();
        assert_eq!(
            situation.location,
            super::super::script::LocationRef::Fixed("docks".into())
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let script = script();
        let mut instance = SceneInstance::new(script.clone());
        instance.set_state(SceneState::AwaitingSituation(1));
        instance.ledger(TransientResource::Item("room_key".into()));

        let snapshot = instance.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SceneSnapshot = serde_json::from_str(&json).unwrap();
        let restored = SceneInstance::restore(back, script);

        assert_eq!(restored.state(), SceneState::AwaitingSituation(1));
        assert_eq!(restored.transients().len(), 1);
    }
}
