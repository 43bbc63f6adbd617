use crate::domain::{Listing, ListingId};
use crate::engine::{CollectionKind, CollectionObserver};
use crate::templates::components::listing_card;
use maud::Markup;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub id: ListingId,
    pub markup: Markup,
}

/// Rendering layer subscribed to collection events. Holds one card per
/// listing in display order.
#[derive(Debug, Default)]
pub struct CardView {
    cards: HashMap<CollectionKind, Vec<RenderedCard>>,
}

impl CardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self, kind: CollectionKind) -> &[RenderedCard] {
        self.cards.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn card_ids(&self, kind: CollectionKind) -> Vec<ListingId> {
        self.cards(kind).iter().map(|c| c.id).collect()
    }
}

impl CollectionObserver for CardView {
    fn entry_added(&mut self, kind: CollectionKind, listing: &Listing) {
        self.cards.entry(kind).or_default().push(RenderedCard {
            id: listing.id,
            markup: listing_card(kind, listing),
        });
    }

    fn entry_removed(&mut self, kind: CollectionKind, id: ListingId) {
        if let Some(cards) = self.cards.get_mut(&kind) {
            cards.retain(|c| c.id != id);
        }
    }

    fn cleared(&mut self, kind: CollectionKind) {
        self.cards.remove(&kind);
    }

    fn reordered(&mut self, kind: CollectionKind, order: &[ListingId]) {
        if let Some(cards) = self.cards.get_mut(&kind) {
            let rank: HashMap<ListingId, usize> =
                order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
            cards.sort_by_key(|c| rank.get(&c.id).copied().unwrap_or(usize::MAX));
        }
    }
}
