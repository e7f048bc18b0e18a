//! Card pile bookkeeping for one conversation.
//!
//! Four piles, all holding card ids only (definitions stay in the catalog):
//!
//! - `deck`: face-down draw pile, top at the end of the vec
//! - `hand`: cards currently held
//! - `discard`: recyclable pile, fed by discard-down; shuffled back into the
//!   deck when the deck runs dry
//! - `exhausted`: Statement cards that resolved; these never return
//!
//! The split between `discard` and `exhausted` is what keeps the mandatory
//! reshuffle from resurrecting consumed Statements while still preventing
//! sustainability deadlock in long conversations.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, SessionRng};

/// Maximum hand size outside a pending discard-down.
pub const HAND_LIMIT: usize = 7;

/// The four piles of a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPiles {
    deck: Vec<CardId>,
    hand: Vec<CardId>,
    discard: Vec<CardId>,
    exhausted: Vec<CardId>,
}

impl CardPiles {
    /// Create piles from an initial deck composition (an ordered multiset).
    #[must_use]
    pub fn new(deck: Vec<CardId>) -> Self {
        Self {
            deck,
            hand: Vec::new(),
            discard: Vec::new(),
            exhausted: Vec::new(),
        }
    }

    /// Shuffle the draw pile.
    pub fn shuffle_deck(&mut self, rng: &mut SessionRng) {
        rng.shuffle(&mut self.deck);
    }

    /// Draw one card into hand.
    ///
    /// If the deck is empty, the recyclable discard is shuffled back in
    /// first. Returns `None` only when deck and discard are both empty.
    pub fn draw(&mut self, rng: &mut SessionRng) -> Option<CardId> {
        if self.deck.is_empty() && !self.discard.is_empty() {
            tracing::debug!(recycled = self.discard.len(), "reshuffling discard into deck");
            self.deck.append(&mut self.discard);
            rng.shuffle(&mut self.deck);
        }

        let card = self.deck.pop()?;
        self.hand.push(card.clone());
        Some(card)
    }

    /// Cards currently in hand, in draw order.
    #[must_use]
    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    /// Is this card in hand?
    #[must_use]
    pub fn in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    /// Remove one copy of a card from hand.
    ///
    /// Returns `false` if no copy is held.
    pub fn remove_from_hand(&mut self, card: &CardId) -> bool {
        if let Some(pos) = self.hand.iter().position(|c| c == card) {
            self.hand.remove(pos);
            true
        } else {
            false
        }
    }

    /// Return a resolved Echo card to the bottom of the deck.
    pub fn return_to_deck(&mut self, card: CardId) {
        self.deck.insert(0, card);
    }

    /// Move a discarded-down card to the recyclable pile.
    pub fn to_discard(&mut self, card: CardId) {
        self.discard.push(card);
    }

    /// Consume a resolved Statement card for the rest of the session.
    pub fn exhaust(&mut self, card: CardId) {
        self.exhausted.push(card);
    }

    /// Hand size over the limit, pending a discard-down?
    #[must_use]
    pub fn over_hand_limit(&self) -> bool {
        self.hand.len() > HAND_LIMIT
    }

    /// How many cards a discard-down must select right now.
    #[must_use]
    pub fn discard_down_count(&self) -> usize {
        self.hand.len().saturating_sub(HAND_LIMIT)
    }

    #[must_use]
    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    #[must_use]
    pub fn exhausted_len(&self) -> usize {
        self.exhausted.len()
    }

    /// Exhausted Statement cards, in play order.
    #[must_use]
    pub fn exhausted(&self) -> &[CardId] {
        &self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<CardId> {
        names.iter().map(|n| CardId::new(*n)).collect()
    }

    #[test]
    fn test_draw_from_deck() {
        let mut piles = CardPiles::new(ids(&["a", "b", "c"]));
        let mut rng = SessionRng::new(1);

        let drawn = piles.draw(&mut rng).unwrap();
        assert_eq!(drawn, CardId::new("c")); // top is the end
        assert_eq!(piles.hand(), &[CardId::new("c")]);
        assert_eq!(piles.deck_len(), 2);
    }

    #[test]
    fn test_empty_deck_reshuffles_discard() {
        let mut piles = CardPiles::new(ids(&["a"]));
        let mut rng = SessionRng::new(1);

        piles.draw(&mut rng).unwrap();
        assert!(piles.remove_from_hand(&CardId::new("a")));
        piles.to_discard(CardId::new("a"));

        // Deck is empty but discard holds "a": the draw must still succeed.
        let drawn = piles.draw(&mut rng).unwrap();
        assert_eq!(drawn, CardId::new("a"));
        assert_eq!(piles.discard_len(), 0);
    }

    #[test]
    fn test_exhausted_cards_never_recycle() {
        let mut piles = CardPiles::new(ids(&["a", "b"]));
        let mut rng = SessionRng::new(1);

        piles.draw(&mut rng).unwrap();
        piles.draw(&mut rng).unwrap();
        assert!(piles.remove_from_hand(&CardId::new("a")));
        piles.exhaust(CardId::new("a"));
        assert!(piles.remove_from_hand(&CardId::new("b")));
        piles.to_discard(CardId::new("b"));

        // Only "b" comes back.
        assert_eq!(piles.draw(&mut rng), Some(CardId::new("b")));
        assert_eq!(piles.draw(&mut rng), None);
        assert_eq!(piles.exhausted(), &[CardId::new("a")]);
    }

    #[test]
    fn test_echo_returns_to_deck_bottom() {
        let mut piles = CardPiles::new(ids(&["a", "b"]));
        let mut rng = SessionRng::new(1);

        piles.draw(&mut rng).unwrap(); // draws "b"
        assert!(piles.remove_from_hand(&CardId::new("b")));
        piles.return_to_deck(CardId::new("b"));

        // "a" is above the returned "b".
        assert_eq!(piles.draw(&mut rng), Some(CardId::new("a")));
        assert_eq!(piles.draw(&mut rng), Some(CardId::new("b")));
    }

    #[test]
    fn test_duplicate_ids_remove_single_copy() {
        let mut piles = CardPiles::new(ids(&["a", "a"]));
        let mut rng = SessionRng::new(1);

        piles.draw(&mut rng).unwrap();
        piles.draw(&mut rng).unwrap();
        assert_eq!(piles.hand().len(), 2);

        assert!(piles.remove_from_hand(&CardId::new("a")));
        assert_eq!(piles.hand(), &[CardId::new("a")]);
    }

    #[test]
    fn test_hand_limit_accounting() {
        let mut piles = CardPiles::new(ids(&["a", "b", "c", "d", "e", "f", "g", "h", "i"]));
        let mut rng = SessionRng::new(1);

        for _ in 0..9 {
            piles.draw(&mut rng).unwrap();
        }

        assert!(piles.over_hand_limit());
        assert_eq!(piles.discard_down_count(), 2);
    }

    #[test]
    fn test_serde_round_trip() {
        let piles = CardPiles::new(ids(&["a", "b"]));
        let json = serde_json::to_string(&piles).unwrap();
        let back: CardPiles = serde_json::from_str(&json).unwrap();
        assert_eq!(piles, back);
    }
}
