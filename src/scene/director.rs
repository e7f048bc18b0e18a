//! The scene state machine.
//!
//! The director owns every scene instance in the save and re-evaluates
//! resumption predicates on each player context change. A matching situation
//! surfaces its choices in place of default location interactions; choosing
//! applies the choice's branch atomically, spawns its transients, and
//! advances the scene — seamlessly, if the next situation already matches
//! the same context.
//!
//! Consistency is the director's other job: a situation whose referenced NPC
//! has left the world can never resume, so the scene abandons and every
//! ledgered transient is torn down. Orphaned generated locations or items
//! are an invariant violation.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::core::{ContextEvent, ResourcePool, SceneError, SceneId, WorldError};
use crate::effects::{EffectDescription, EffectResolver};
use crate::world::WorldState;

use super::instance::{SceneInstance, SceneSnapshot, SceneState};
use super::script::{LocationRef, SceneScript, Situation, SituationChoice, TransientResource};

/// What one observation pass found.
#[derive(Clone, Debug, Default)]
pub struct ObserveReport {
    /// Scenes whose current situation matches the context, in registration
    /// order. Their choices are surfaced.
    pub engaged: Vec<SceneId>,
    /// Scenes abandoned by this pass, with the consistency failure that
    /// forced each one.
    pub abandoned: Vec<SceneError>,
}

/// What choosing did.
#[derive(Clone, Debug)]
pub struct ChoiceOutcome {
    pub scene: SceneId,
    /// Descriptions of the applied effects.
    pub applied: Vec<EffectDescription>,
    /// The final situation completed; the scene is done.
    pub completed: bool,
    /// The next situation matched the same context and is already engaged.
    pub seamless: bool,
    /// The advance hit a consistency failure and the scene abandoned.
    pub abandoned: bool,
}

/// Owns and advances all scene instances for one save.
#[derive(Debug, Default)]
pub struct SceneDirector {
    scenes: Vec<SceneInstance>,
    engaged: FxHashSet<SceneId>,
    last_context: Option<ContextEvent>,
}

impl SceneDirector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene script, not yet triggered.
    pub fn register(&mut self, script: Arc<SceneScript>) -> Result<(), SceneError> {
        if self.find(&script.id).is_some() {
            return Err(SceneError::AlreadyRegistered(script.id.clone()));
        }
        self.scenes.push(SceneInstance::new(script));
        Ok(())
    }

    /// Trigger a registered scene: it starts awaiting its first situation.
    pub fn trigger(&mut self, scene: &SceneId) -> Result<(), SceneError> {
        let instance = self
            .find_mut(scene)
            .ok_or_else(|| SceneError::UnknownScene(scene.clone()))?;

        if instance.state() != SceneState::NotStarted {
            return Err(SceneError::NotTriggerable(scene.clone()));
        }

        instance.set_state(SceneState::AwaitingSituation(0));
        tracing::info!(%scene, "scene triggered");
        Ok(())
    }

    /// Current state of a scene.
    pub fn state(&self, scene: &SceneId) -> Result<SceneState, SceneError> {
        self.find(scene)
            .map(SceneInstance::state)
            .ok_or_else(|| SceneError::UnknownScene(scene.clone()))
    }

    /// Transients a scene currently holds. Empty after completion or
    /// abandonment.
    pub fn transients(&self, scene: &SceneId) -> Result<&[TransientResource], SceneError> {
        self.find(scene)
            .map(SceneInstance::transients)
            .ok_or_else(|| SceneError::UnknownScene(scene.clone()))
    }

    /// Re-evaluate every awaiting scene against a new player context.
    pub fn observe(&mut self, ctx: &ContextEvent, world: &mut dyn WorldState) -> ObserveReport {
        self.engaged.clear();
        self.last_context = Some(ctx.clone());

        let mut report = ObserveReport::default();

        for index in 0..self.scenes.len() {
            let Some(situation) = self.scenes[index].current_situation().cloned() else {
                continue;
            };
            let scene = self.scenes[index].id().clone();

            match predicate_matches(&scene, &situation, ctx, world) {
                Ok(true) => {
                    self.engaged.insert(scene.clone());
                    report.engaged.push(scene);
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(%scene, %err, "scene context permanently lost");
                    self.scenes[index].set_state(SceneState::Abandoned);
                    teardown(&mut self.scenes[index], world);
                    report.abandoned.push(err);
                }
            }
        }

        report
    }

    /// The choices of a scene's engaged situation.
    pub fn choices(&self, scene: &SceneId) -> Result<&[SituationChoice], SceneError> {
        if !self.engaged.contains(scene) {
            return Err(SceneError::NotEngaged(scene.clone()));
        }
        let instance = self
            .find(scene)
            .ok_or_else(|| SceneError::UnknownScene(scene.clone()))?;
        let situation = instance
            .current_situation()
            .ok_or_else(|| SceneError::NotEngaged(scene.clone()))?;
        Ok(&situation.choices)
    }

    /// Take a choice in an engaged situation.
    ///
    /// The choice's branch applies atomically against the provided pool and
    /// the world; a precondition failure leaves the situation engaged so the
    /// player can pick differently. On success the scene advances, spawning
    /// and ledgering the choice's transients first.
    pub fn choose(
        &mut self,
        scene: &SceneId,
        choice: usize,
        pool: &mut ResourcePool,
        world: &mut dyn WorldState,
    ) -> Result<ChoiceOutcome, SceneError> {
        if !self.engaged.contains(scene) {
            return Err(SceneError::NotEngaged(scene.clone()));
        }

        let instance_index = self
            .scenes
            .iter()
            .position(|s| s.id() == scene)
            .ok_or_else(|| SceneError::UnknownScene(scene.clone()))?;

        let situation_index = self.scenes[instance_index]
            .situation_index()
            .ok_or_else(|| SceneError::NotEngaged(scene.clone()))?;

        let situation = self.scenes[instance_index].script().situations[situation_index].clone();
        let chosen = situation
            .choices
            .get(choice)
            .ok_or_else(|| SceneError::UnknownChoice {
                scene: scene.clone(),
                index: choice,
            })?
            .clone();

        // Transient ids are claimed world-wide; validate before any effect
        // commits so a clash leaves no partial application behind.
        for spawn in &chosen.spawns {
            let clashes = match spawn {
                TransientResource::Location(location) => world.location_exists(location),
                TransientResource::Item(item) => world.has_item(item),
            };
            if clashes {
                return Err(SceneError::TransientClaimed {
                    scene: scene.clone(),
                    resource: spawn.to_string(),
                });
            }
        }

        let applied = EffectResolver::apply_branch(&chosen.effects, pool, world)?;

        for spawn in chosen.spawns {
            match &spawn {
                TransientResource::Location(location) => {
                    if let Err(err) = world.create_location(location) {
                        panic!("world rejected validated spawn of {location}: {err}");
                    }
                }
                TransientResource::Item(item) => world.grant_item(item),
            }
            self.scenes[instance_index].ledger(spawn);
        }

        let next = situation_index + 1;
        let total = self.scenes[instance_index].script().situations.len();

        if next == total {
            self.scenes[instance_index].set_state(SceneState::Completed);
            teardown(&mut self.scenes[instance_index], world);
            self.engaged.remove(scene);
            tracing::info!(%scene, "scene completed");
            return Ok(ChoiceOutcome {
                scene: scene.clone(),
                applied,
                completed: true,
                seamless: false,
                abandoned: false,
            });
        }

        self.scenes[instance_index].set_state(SceneState::AwaitingSituation(next));

        // Seamless advance: if the next situation already matches the very
        // context the player is standing in, stay engaged with no exit to
        // free roam in between.
        let next_situation = self.scenes[instance_index].script().situations[next].clone();
        let ctx = self
            .last_context
            .clone()
            .unwrap_or_else(|| unreachable!("engaged without an observed context"));

        match predicate_matches(scene, &next_situation, &ctx, world) {
            Ok(true) => Ok(ChoiceOutcome {
                scene: scene.clone(),
                applied,
                completed: false,
                seamless: true,
                abandoned: false,
            }),
            Ok(false) => {
                self.engaged.remove(scene);
                Ok(ChoiceOutcome {
                    scene: scene.clone(),
                    applied,
                    completed: false,
                    seamless: false,
                    abandoned: false,
                })
            }
            Err(err) => {
                tracing::warn!(%scene, %err, "scene context lost on advance");
                self.scenes[instance_index].set_state(SceneState::Abandoned);
                teardown(&mut self.scenes[instance_index], world);
                self.engaged.remove(scene);
                Ok(ChoiceOutcome {
                    scene: scene.clone(),
                    applied,
                    completed: false,
                    seamless: false,
                    abandoned: true,
                })
            }
        }
    }

    /// Explicitly abandon a scene, tearing down its transients.
    pub fn abandon(&mut self, scene: &SceneId, world: &mut dyn WorldState) -> Result<(), SceneError> {
        let instance_index = self
            .scenes
            .iter()
            .position(|s| s.id() == scene)
            .ok_or_else(|| SceneError::UnknownScene(scene.clone()))?;

        self.scenes[instance_index].set_state(SceneState::Abandoned);
        teardown(&mut self.scenes[instance_index], world);
        self.engaged.remove(scene);
        tracing::info!(%scene, "scene abandoned");
        Ok(())
    }

    /// Serializable capture of every instance.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SceneSnapshot> {
        self.scenes.iter().map(SceneInstance::snapshot).collect()
    }

    /// Rebuild from snapshots and the scripts they were taken against.
    ///
    /// Engagement is not persisted; the next context event re-derives it.
    pub fn restore(
        snapshots: Vec<SceneSnapshot>,
        scripts: &[Arc<SceneScript>],
    ) -> Result<Self, SceneError> {
        let mut scenes = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let script = scripts
                .iter()
                .find(|s| s.id == snapshot.scene)
                .cloned()
                .ok_or_else(|| SceneError::UnknownScene(snapshot.scene.clone()))?;
            scenes.push(SceneInstance::restore(snapshot, script));
        }
        Ok(Self {
            scenes,
            engaged: FxHashSet::default(),
            last_context: None,
        })
    }

    fn find(&self, scene: &SceneId) -> Option<&SceneInstance> {
        self.scenes.iter().find(|s| s.id() == scene)
    }

    fn find_mut(&mut self, scene: &SceneId) -> Option<&mut SceneInstance> {
        self.scenes.iter_mut().find(|s| s.id() == scene)
    }
}

/// Does a situation's resumption predicate match this context?
///
/// `Err` means the context is permanently unreachable (a referenced NPC no
/// longer exists), which forces abandonment.
fn predicate_matches(
    scene: &SceneId,
    situation: &Situation,
    ctx: &ContextEvent,
    world: &dyn WorldState,
) -> Result<bool, SceneError> {
    let resolved = match &situation.location {
        LocationRef::Fixed(location) => location.clone(),
        LocationRef::AtNpc(npc) => match world.npc_location(npc) {
            Ok(location) => location,
            Err(WorldError::NpcNotFound(npc)) => {
                return Err(SceneError::ConsistencyLost {
                    scene: scene.clone(),
                    npc,
                })
            }
            // npc_location only fails with NpcNotFound.
            Err(_) => return Ok(false),
        },
    };

    if let Some(npc) = &situation.required_npc {
        if !world.npc_exists(npc) {
            return Err(SceneError::ConsistencyLost {
                scene: scene.clone(),
                npc: npc.clone(),
            });
        }
    }

    if ctx.location != resolved {
        return Ok(false);
    }

    match &situation.required_npc {
        None => Ok(true),
        Some(npc) => Ok(world.npcs_at(&ctx.location).contains(npc)),
    }
}

/// Destroy every ledgered transient. Resources already gone are fine; the
/// guarantee is that nothing the scene created outlives it.
fn teardown(instance: &mut SceneInstance, world: &mut dyn WorldState) {
    for transient in instance.take_transients() {
        let result = match &transient {
            TransientResource::Location(location) => world.destroy_location(location),
            TransientResource::Item(item) => world.remove_item(item),
        };
        match result {
            Ok(()) => tracing::debug!(scene = %instance.id(), %transient, "transient torn down"),
            Err(_) => tracing::debug!(scene = %instance.id(), %transient, "transient already gone"),
        }
    }
}
