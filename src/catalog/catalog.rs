//! The process-wide card table.
//!
//! Built once at startup, validated, then shared by reference across every
//! session. There is no mutation API.

use rustc_hash::FxHashMap;

use crate::core::{CardId, ContentError};

use super::card::{Card, CardType, Persistence};

/// Read-only table of card definitions.
///
/// ## Example
///
/// ```
/// use parlance::catalog::{Card, CardCatalog, CardType, Persistence};
/// use parlance::effects::Effect;
///
/// let catalog = CardCatalog::new(vec![
///     Card::new("warm_greeting", "Warm Greeting", CardType::Normal, 0, Persistence::Echo, 0)
///         .on_success([Effect::initiative(2)]),
/// ]).unwrap();
///
/// let card = catalog.get(&"warm_greeting".into()).unwrap();
/// assert_eq!(card.name, "Warm Greeting");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, Card>,
}

impl CardCatalog {
    /// Build and validate a catalog.
    ///
    /// Validation failures are fatal at boot:
    /// - duplicate card ids
    /// - negative initiative cost
    /// - a card generating initiative on success without Echo persistence
    ///   (renewable generators must be recyclable or the economy depletes)
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Result<Self, ContentError> {
        let mut table: FxHashMap<CardId, Card> = FxHashMap::default();

        for card in cards {
            Self::validate(&card)?;
            if table.contains_key(&card.id) {
                return Err(ContentError::DuplicateCard(card.id));
            }
            table.insert(card.id.clone(), card);
        }

        tracing::info!(cards = table.len(), "card catalog loaded");
        Ok(Self { cards: table })
    }

    fn validate(card: &Card) -> Result<(), ContentError> {
        if card.initiative_cost < 0 {
            return Err(ContentError::InvalidCard {
                card: card.id.clone(),
                reason: format!("negative initiative cost {}", card.initiative_cost),
            });
        }
        if card.success_initiative() > 0 && card.persistence != Persistence::Echo {
            return Err(ContentError::NonRenewableGenerator(card.id.clone()));
        }
        Ok(())
    }

    /// Look up a card by id.
    ///
    /// An unknown id is a content defect, fatal at boot; sessions only ever
    /// hold ids that were validated at start.
    pub fn get(&self, id: &CardId) -> Result<&Card, ContentError> {
        self.cards
            .get(id)
            .ok_or_else(|| ContentError::UnknownCard(id.clone()))
    }

    /// Check if a card id is known.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Is the catalog empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Cards of a given type.
    pub fn by_type(&self, card_type: CardType) -> impl Iterator<Item = &Card> {
        self.cards
            .values()
            .filter(move |c| c.card_type == card_type)
    }

    /// Cards of a given persistence.
    pub fn by_persistence(&self, persistence: Persistence) -> impl Iterator<Item = &Card> {
        self.cards
            .values()
            .filter(move |c| c.persistence == persistence)
    }

    /// Cards at a given depth tier.
    pub fn by_depth(&self, depth: u8) -> impl Iterator<Item = &Card> {
        self.cards.values().filter(move |c| c.depth == depth)
    }

    /// Cards matching a predicate.
    pub fn find<F>(&self, predicate: F) -> impl Iterator<Item = &Card>
    where
        F: Fn(&Card) -> bool,
    {
        self.cards.values().filter(move |c| predicate(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;

    fn card(id: &str, depth: u8, persistence: Persistence) -> Card {
        Card::new(id, id.to_uppercase(), CardType::Normal, depth, persistence, 0)
    }

    #[test]
    fn test_build_and_lookup() {
        let catalog = CardCatalog::new(vec![card("a", 0, Persistence::Echo)]).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(&CardId::new("a")));
        assert_eq!(catalog.get(&CardId::new("a")).unwrap().name, "A");

        assert_eq!(
            catalog.get(&CardId::new("missing")).unwrap_err(),
            ContentError::UnknownCard(CardId::new("missing"))
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = CardCatalog::new(vec![
            card("a", 0, Persistence::Echo),
            card("a", 1, Persistence::Echo),
        ])
        .unwrap_err();

        assert_eq!(err, ContentError::DuplicateCard(CardId::new("a")));
    }

    #[test]
    fn test_initiative_generator_must_be_echo() {
        let bad = Card::new("gen", "Gen", CardType::Normal, 0, Persistence::Statement, 0)
            .on_success([Effect::initiative(2)]);

        let err = CardCatalog::new(vec![bad]).unwrap_err();
        assert_eq!(err, ContentError::NonRenewableGenerator(CardId::new("gen")));
    }

    #[test]
    fn test_net_negative_initiative_statement_allowed() {
        // A Statement that spends more initiative than it grants is fine.
        let ok = Card::new("sink", "Sink", CardType::Normal, 2, Persistence::Statement, 1)
            .on_success([Effect::initiative(1), Effect::initiative(-2)]);

        assert!(CardCatalog::new(vec![ok]).is_ok());
    }

    #[test]
    fn test_filtered_enumeration() {
        let catalog = CardCatalog::new(vec![
            card("a", 0, Persistence::Echo),
            card("b", 0, Persistence::Statement),
            Card::new("r", "R", CardType::Request, 1, Persistence::Statement, 0),
        ])
        .unwrap();

        assert_eq!(catalog.by_depth(0).count(), 2);
        assert_eq!(catalog.by_persistence(Persistence::Echo).count(), 1);
        assert_eq!(catalog.by_type(CardType::Request).count(), 1);
        assert_eq!(catalog.find(|c| c.is_foundation()).count(), 3);
    }
}
