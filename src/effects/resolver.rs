//! Atomic resolution of effect branches.
//!
//! A branch applies all-or-nothing: every effect is staged against a scratch
//! resource pool and a transaction view of the world, and only when the whole
//! branch validates are the staged operations committed. A precondition
//! failure anywhere rolls the branch back with no observable change.
//!
//! The transaction view overlays staged changes on read-through queries, so
//! effects within one branch see each other: a `TokenGain` followed by a
//! `TokenSpend` of the combined balance validates, and two unlocks of the
//! same route in one branch correctly fail the second.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{
    FactId, LetterId, LocationId, NpcId, ObligationId, PreconditionFailure, ResourcePool, RouteId,
    TokenKind,
};
use crate::world::WorldState;

use super::describe::{describe, EffectDescription};
use super::effect::Effect;

/// A world mutation staged by validation and ready to commit.
#[derive(Clone, Debug)]
enum WorldOp {
    ModifyToken(TokenKind, i64),
    Reveal(FactId),
    UnlockRoute(RouteId),
    UnlockNpc(NpcId),
    UnlockLocation(LocationId),
    CreateObligation(ObligationId),
    ExtendDeadline(LetterId, i64),
    ReorderLetter(LetterId, usize),
    SwapLetters(LetterId, LetterId),
    RemoveLetter(LetterId),
    AddLetter(LetterId),
    AdvanceTime(i64),
    ModifyNpcState(NpcId, String, i64),
    OpenNegotiation(NpcId),
}

/// Staged changes overlaid on world queries during validation.
#[derive(Default)]
struct TxnView {
    token_deltas: FxHashMap<TokenKind, i64>,
    revealed: FxHashSet<FactId>,
    /// Materialized queue, populated lazily by the first letter operation.
    letters: Option<Vec<LetterId>>,
    unlocked_routes: FxHashSet<RouteId>,
    unlocked_npcs: FxHashSet<NpcId>,
    unlocked_locations: FxHashSet<LocationId>,
    obligations: FxHashSet<ObligationId>,
    negotiations: FxHashSet<NpcId>,
}

impl TxnView {
    fn token_balance(&self, world: &dyn WorldState, token: &TokenKind) -> i64 {
        world.token_balance(token) + self.token_deltas.get(token).copied().unwrap_or(0)
    }

    fn is_revealed(&self, world: &dyn WorldState, fact: &FactId) -> bool {
        self.revealed.contains(fact) || world.is_revealed(fact)
    }

    fn letters_mut(&mut self, world: &dyn WorldState) -> &mut Vec<LetterId> {
        self.letters.get_or_insert_with(|| world.letter_queue())
    }
}

/// Resolves one outcome branch against session resources and the world.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply a whole branch atomically.
    ///
    /// On success every effect has been applied, in order, and the
    /// descriptions of the applied effects are returned. On failure nothing
    /// has changed and the first failing precondition is returned.
    pub fn apply_branch(
        branch: &[Effect],
        pool: &mut ResourcePool,
        world: &mut dyn WorldState,
    ) -> Result<Vec<EffectDescription>, PreconditionFailure> {
        let mut scratch = pool.clone();
        let mut view = TxnView::default();
        let mut ops = Vec::new();
        let mut applied = Vec::with_capacity(branch.len());

        for effect in branch {
            if let Err(failure) = Self::stage(effect, &mut scratch, &mut view, &mut ops, world) {
                tracing::debug!(%failure, "effect branch rolled back");
                return Err(failure);
            }
            applied.push(describe(effect));
        }

        Self::commit(ops, world);
        *pool = scratch;
        Ok(applied)
    }

    /// Validate one effect and stage its world operations.
    fn stage(
        effect: &Effect,
        scratch: &mut ResourcePool,
        view: &mut TxnView,
        ops: &mut Vec<WorldOp>,
        world: &dyn WorldState,
    ) -> Result<(), PreconditionFailure> {
        match effect {
            Effect::Resource { kind, delta } => {
                scratch.apply(*kind, *delta);
            }

            Effect::TokenGain { token, amount } => {
                *view.token_deltas.entry(token.clone()).or_insert(0) += amount;
                ops.push(WorldOp::ModifyToken(token.clone(), *amount));
            }

            Effect::TokenSpend { token, amount } => {
                let available = view.token_balance(world, token);
                if available < *amount {
                    return Err(PreconditionFailure::TokenBalance {
                        token: token.clone(),
                        requested: *amount,
                        available,
                    });
                }
                *view.token_deltas.entry(token.clone()).or_insert(0) -= amount;
                ops.push(WorldOp::ModifyToken(token.clone(), -amount));
            }

            Effect::LetterReorder { letter, position } => {
                let queue = view.letters_mut(world);
                let current = queue
                    .iter()
                    .position(|l| l == letter)
                    .ok_or_else(|| PreconditionFailure::MissingLetter(letter.clone()))?;
                if *position >= queue.len() {
                    return Err(PreconditionFailure::LetterPosition {
                        position: *position,
                        len: queue.len(),
                    });
                }
                let moved = queue.remove(current);
                queue.insert(*position, moved);
                ops.push(WorldOp::ReorderLetter(letter.clone(), *position));
            }

            Effect::LetterSwap { first, second } => {
                let queue = view.letters_mut(world);
                let a = queue
                    .iter()
                    .position(|l| l == first)
                    .ok_or_else(|| PreconditionFailure::MissingLetter(first.clone()))?;
                let b = queue
                    .iter()
                    .position(|l| l == second)
                    .ok_or_else(|| PreconditionFailure::MissingLetter(second.clone()))?;
                queue.swap(a, b);
                ops.push(WorldOp::SwapLetters(first.clone(), second.clone()));
            }

            Effect::LetterRemove { letter } => {
                let queue = view.letters_mut(world);
                let index = queue
                    .iter()
                    .position(|l| l == letter)
                    .ok_or_else(|| PreconditionFailure::MissingLetter(letter.clone()))?;
                queue.remove(index);
                ops.push(WorldOp::RemoveLetter(letter.clone()));
            }

            Effect::LetterAdd { letter } => {
                view.letters_mut(world).push(letter.clone());
                ops.push(WorldOp::AddLetter(letter.clone()));
            }

            Effect::DeadlineExtend { letter, segments } => {
                if !view.letters_mut(world).contains(letter) {
                    return Err(PreconditionFailure::MissingLetter(letter.clone()));
                }
                ops.push(WorldOp::ExtendDeadline(letter.clone(), *segments));
            }

            Effect::InformationGain { fact } | Effect::InformationReveal { fact } => {
                // Idempotent: a known fact stays known, the branch continues.
                if !view.is_revealed(world, fact) {
                    view.revealed.insert(fact.clone());
                    ops.push(WorldOp::Reveal(fact.clone()));
                }
            }

            Effect::ObligationCreate { obligation } => {
                if world.has_obligation(obligation) || view.obligations.contains(obligation) {
                    return Err(PreconditionFailure::ObligationExists(obligation.clone()));
                }
                view.obligations.insert(obligation.clone());
                ops.push(WorldOp::CreateObligation(obligation.clone()));
            }

            Effect::RouteUnlock { route } => {
                if world.route_unlocked(route) || view.unlocked_routes.contains(route) {
                    return Err(PreconditionFailure::RouteAlreadyUnlocked(route.clone()));
                }
                view.unlocked_routes.insert(route.clone());
                ops.push(WorldOp::UnlockRoute(route.clone()));
            }

            Effect::NpcUnlock { npc } => {
                if !world.npc_exists(npc) {
                    return Err(PreconditionFailure::MissingNpc(npc.clone()));
                }
                if world.npc_unlocked(npc) || view.unlocked_npcs.contains(npc) {
                    return Err(PreconditionFailure::NpcAlreadyUnlocked(npc.clone()));
                }
                view.unlocked_npcs.insert(npc.clone());
                ops.push(WorldOp::UnlockNpc(npc.clone()));
            }

            Effect::LocationUnlock { location } => {
                if !world.location_exists(location) {
                    return Err(PreconditionFailure::MissingLocation(location.clone()));
                }
                if world.location_unlocked(location) || view.unlocked_locations.contains(location)
                {
                    return Err(PreconditionFailure::LocationAlreadyUnlocked(
                        location.clone(),
                    ));
                }
                view.unlocked_locations.insert(location.clone());
                ops.push(WorldOp::UnlockLocation(location.clone()));
            }

            Effect::TimePassage { segments } => {
                ops.push(WorldOp::AdvanceTime(*segments));
            }

            Effect::StateChange { npc, key, delta } => {
                if !world.npc_exists(npc) {
                    return Err(PreconditionFailure::MissingNpc(npc.clone()));
                }
                ops.push(WorldOp::ModifyNpcState(npc.clone(), key.clone(), *delta));
            }

            Effect::NegotiationOpen { npc } => {
                if !world.npc_exists(npc) {
                    return Err(PreconditionFailure::MissingNpc(npc.clone()));
                }
                if world.negotiation_open(npc) || view.negotiations.contains(npc) {
                    return Err(PreconditionFailure::NegotiationAlreadyOpen(npc.clone()));
                }
                view.negotiations.insert(npc.clone());
                ops.push(WorldOp::OpenNegotiation(npc.clone()));
            }
        }

        Ok(())
    }

    /// Commit staged operations.
    ///
    /// Every fallible operation was validated during staging and nothing
    /// else runs between staging and commit, so a rejection here means the
    /// collaborator broke its contract.
    fn commit(ops: Vec<WorldOp>, world: &mut dyn WorldState) {
        for op in ops {
            match op {
                WorldOp::ModifyToken(token, delta) => world.modify_token(&token, delta),
                WorldOp::Reveal(fact) => world.reveal(&fact),
                WorldOp::UnlockRoute(route) => world.unlock_route(&route),
                WorldOp::UnlockNpc(npc) => world.unlock_npc(&npc),
                WorldOp::UnlockLocation(location) => {
                    if let Err(err) = world.unlock_location(&location) {
                        panic!("world rejected staged unlock of {location}: {err}");
                    }
                }
                WorldOp::CreateObligation(obligation) => world.create_obligation(&obligation),
                WorldOp::ExtendDeadline(letter, segments) => {
                    if let Err(err) = world.extend_deadline(&letter, segments) {
                        panic!("world rejected staged deadline extension of {letter}: {err}");
                    }
                }
                WorldOp::ReorderLetter(letter, position) => {
                    if let Err(err) = world.reorder_letter(&letter, position) {
                        panic!("world rejected staged reorder of {letter}: {err}");
                    }
                }
                WorldOp::SwapLetters(first, second) => {
                    if let Err(err) = world.swap_letters(&first, &second) {
                        panic!("world rejected staged swap of {first}/{second}: {err}");
                    }
                }
                WorldOp::RemoveLetter(letter) => {
                    if let Err(err) = world.remove_letter(&letter) {
                        panic!("world rejected staged removal of {letter}: {err}");
                    }
                }
                WorldOp::AddLetter(letter) => world.add_letter(&letter),
                WorldOp::AdvanceTime(segments) => world.advance_time(segments),
                WorldOp::ModifyNpcState(npc, key, delta) => {
                    if let Err(err) = world.modify_npc_state(&npc, &key, delta) {
                        panic!("world rejected staged state change for {npc}: {err}");
                    }
                }
                WorldOp::OpenNegotiation(npc) => {
                    if let Err(err) = world.open_negotiation(&npc) {
                        panic!("world rejected staged negotiation with {npc}: {err}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MemoryWorld;

    fn sample_world() -> MemoryWorld {
        MemoryWorld::new()
            .with_npc("elena", "common_room")
            .with_letter("letter_to_brina")
            .with_letter("letter_to_cole")
            .with_tokens("trust", 2)
    }

    #[test]
    fn test_successful_branch_applies_everything() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();

        let branch = vec![
            Effect::initiative(2),
            Effect::token_gain("trust", 1),
            Effect::reveal("elena_past"),
        ];

        let applied = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap();

        assert_eq!(applied.len(), 3);
        assert_eq!(pool.initiative(), 2);
        assert_eq!(world.token_balance(&TokenKind::new("trust")), 3);
        assert!(world.is_revealed(&FactId::new("elena_past")));
    }

    #[test]
    fn test_failing_branch_rolls_back_completely() {
        let mut world = sample_world();
        let snapshot = world.clone();
        let mut pool = ResourcePool::seeded(1, 5, 0, 0);
        let pool_before = pool.clone();

        // Last effect overdraws: everything before it must also roll back.
        let branch = vec![
            Effect::momentum(3),
            Effect::reveal("elena_past"),
            Effect::token_spend("trust", 10),
        ];

        let failure = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap_err();

        assert_eq!(
            failure,
            PreconditionFailure::TokenBalance {
                token: TokenKind::new("trust"),
                requested: 10,
                available: 2,
            }
        );
        assert_eq!(pool, pool_before);
        assert_eq!(world, snapshot);
    }

    #[test]
    fn test_gain_funds_spend_within_branch() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();

        // Balance is 2; the spend of 5 is only covered by the staged gain.
        let branch = vec![
            Effect::token_gain("trust", 4),
            Effect::token_spend("trust", 5),
        ];

        EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap();
        assert_eq!(world.token_balance(&TokenKind::new("trust")), 1);
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();
        let fact = FactId::new("elena_past");
        world.reveal(&fact);
        let snapshot = world.clone();

        let branch = vec![Effect::reveal("elena_past")];
        let applied = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap();

        assert_eq!(applied.len(), 1);
        assert_eq!(world, snapshot);
    }

    #[test]
    fn test_double_unlock_in_one_branch_fails() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();

        let branch = vec![
            Effect::RouteUnlock {
                route: RouteId::new("mountain_pass"),
            },
            Effect::RouteUnlock {
                route: RouteId::new("mountain_pass"),
            },
        ];

        let failure = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap_err();
        assert_eq!(
            failure,
            PreconditionFailure::RouteAlreadyUnlocked(RouteId::new("mountain_pass"))
        );
        assert!(!world.route_unlocked(&RouteId::new("mountain_pass")));
    }

    #[test]
    fn test_letter_operations_see_staged_changes() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();
        let brina = LetterId::new("letter_to_brina");
        let cole = LetterId::new("letter_to_cole");

        // Removing a letter then swapping with it must fail the branch.
        let branch = vec![
            Effect::LetterRemove {
                letter: cole.clone(),
            },
            Effect::LetterSwap {
                first: brina.clone(),
                second: cole.clone(),
            },
        ];

        let failure = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap_err();
        assert_eq!(failure, PreconditionFailure::MissingLetter(cole.clone()));
        assert_eq!(world.letter_queue(), vec![brina, cole]);
    }

    #[test]
    fn test_reorder_position_out_of_range() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();

        let branch = vec![Effect::LetterReorder {
            letter: LetterId::new("letter_to_brina"),
            position: 7,
        }];

        let failure = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap_err();
        assert_eq!(
            failure,
            PreconditionFailure::LetterPosition { position: 7, len: 2 }
        );
    }

    #[test]
    fn test_missing_npc_fails_branch() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();

        let branch = vec![Effect::StateChange {
            npc: NpcId::new("nobody"),
            key: "warmth".to_string(),
            delta: 1,
        }];

        let failure = EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap_err();
        assert_eq!(failure, PreconditionFailure::MissingNpc(NpcId::new("nobody")));
    }

    #[test]
    fn test_time_passage_commits() {
        let mut world = sample_world();
        let mut pool = ResourcePool::new();

        let branch = vec![Effect::TimePassage { segments: 3 }];
        EffectResolver::apply_branch(&branch, &mut pool, &mut world).unwrap();

        assert_eq!(world.now(), 3);
    }
}
