use crate::domain::{Listing, ListingId};
use crate::engine::dedup::DedupIndex;
use crate::engine::markers::LayerId;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    Saved,
    Search,
}

impl CollectionKind {
    pub fn empty_message(self) -> &'static str {
        match self {
            CollectionKind::Saved => "[ no saves ]",
            CollectionKind::Search => "[ nothing found ]",
        }
    }

    pub fn layer(self) -> LayerId {
        match self {
            CollectionKind::Saved => LayerId::Saved,
            CollectionKind::Search => LayerId::Search,
        }
    }

    pub fn other(self) -> Self {
        match self {
            CollectionKind::Saved => CollectionKind::Search,
            CollectionKind::Search => CollectionKind::Saved,
        }
    }
}

/// Client-side ordering of a collection's cards, always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSort {
    Price,
    Area,
    Rooms,
}

impl LocalSort {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "price" => Some(LocalSort::Price),
            "area" => Some(LocalSort::Area),
            "rooms" => Some(LocalSort::Rooms),
            _ => None,
        }
    }

    fn value(self, listing: &Listing) -> Option<f64> {
        let details = &listing.details;
        match self {
            LocalSort::Price => details.price,
            LocalSort::Area => details.area,
            LocalSort::Rooms => details.rooms.map(|r| r as f64),
        }
    }
}

/// Change events a collection emits in the same call that mutates it.
pub trait CollectionObserver {
    fn entry_added(&mut self, _kind: CollectionKind, _listing: &Listing) {}
    fn entry_removed(&mut self, _kind: CollectionKind, _id: ListingId) {}
    fn cleared(&mut self, _kind: CollectionKind) {}
    fn reordered(&mut self, _kind: CollectionKind, _order: &[ListingId]) {}
}

impl<T: CollectionObserver> CollectionObserver for Rc<RefCell<T>> {
    fn entry_added(&mut self, kind: CollectionKind, listing: &Listing) {
        self.borrow_mut().entry_added(kind, listing);
    }

    fn entry_removed(&mut self, kind: CollectionKind, id: ListingId) {
        self.borrow_mut().entry_removed(kind, id);
    }

    fn cleared(&mut self, kind: CollectionKind) {
        self.borrow_mut().cleared(kind);
    }

    fn reordered(&mut self, kind: CollectionKind, order: &[ListingId]) {
        self.borrow_mut().reordered(kind, order);
    }
}

pub struct NoopObserver;

impl CollectionObserver for NoopObserver {}

/// Ordered, deduplicated listings of one collection plus its placeholder
/// and trailing "load more" control. `A` is whatever the owner wants handed
/// back when that control is activated.
///
/// The sequence and the dedup index only change together, and the empty
/// placeholder is shown exactly when the sequence is empty and no fetch for
/// this collection is in flight.
#[derive(Debug)]
pub struct ListingCollection<A> {
    kind: CollectionKind,
    entries: Vec<Listing>,
    index: DedupIndex,
    empty_message: Option<String>,
    load_more: Option<A>,
    fetch_in_flight: bool,
}

impl<A: Clone> ListingCollection<A> {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            index: DedupIndex::new(),
            empty_message: Some(kind.empty_message().to_string()),
            load_more: None,
            fetch_in_flight: false,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn entries(&self) -> &[Listing] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<ListingId> {
        self.entries.iter().map(|l| l.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ListingId) -> bool {
        self.index.has(id)
    }

    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.entries.iter().find(|l| l.id == id)
    }

    pub fn index(&self) -> &DedupIndex {
        &self.index
    }

    pub fn empty_message(&self) -> Option<&str> {
        self.empty_message.as_deref()
    }

    pub fn load_more(&self) -> Option<&A> {
        self.load_more.as_ref()
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Appends unless the id is already known. Returns whether it was added.
    pub fn add_listing(&mut self, listing: Listing, observer: &mut dyn CollectionObserver) -> bool {
        if !self.index.add(listing.id) {
            return false;
        }

        self.empty_message = None;
        observer.entry_added(self.kind, &listing);
        self.entries.push(listing);
        true
    }

    pub fn remove_listing(
        &mut self,
        id: ListingId,
        observer: &mut dyn CollectionObserver,
    ) -> Option<Listing> {
        if !self.index.remove(id) {
            return None;
        }

        let position = self.entries.iter().position(|l| l.id == id)?;
        let listing = self.entries.remove(position);
        observer.entry_removed(self.kind, id);
        self.sync_empty_state();
        Some(listing)
    }

    /// Empties the sequence and the dedup index together and drops the
    /// affordance.
    pub fn clear(&mut self, observer: &mut dyn CollectionObserver) {
        self.entries.clear();
        self.index.clear();
        self.load_more = None;
        observer.cleared(self.kind);
        self.sync_empty_state();
    }

    /// Ignored while the collection has entries.
    pub fn set_empty_message(&mut self, text: impl Into<String>) {
        if self.entries.is_empty() {
            self.empty_message = Some(text.into());
        }
    }

    pub fn clear_empty_message(&mut self) {
        self.empty_message = None;
    }

    pub fn set_load_more(&mut self, action: A) {
        self.load_more = Some(action);
    }

    pub fn clear_load_more(&mut self) {
        self.load_more = None;
    }

    /// Hands back the stored action. Re-entrancy is gated by the caller, which
    /// hides the affordance as soon as the fetch it triggers is issued.
    pub fn activate_load_more(&self) -> Option<A> {
        self.load_more.clone()
    }

    pub fn begin_fetch(&mut self) {
        self.fetch_in_flight = true;
        self.empty_message = None;
    }

    pub fn end_fetch(&mut self) {
        self.fetch_in_flight = false;
        self.sync_empty_state();
    }

    /// Reorders by `key`, highest first; listings without a value go last.
    /// Membership is untouched.
    pub fn sort_by(&mut self, key: LocalSort, observer: &mut dyn CollectionObserver) {
        self.entries.sort_by(|a, b| {
            let va = key.value(a).unwrap_or(f64::NEG_INFINITY);
            let vb = key.value(b).unwrap_or(f64::NEG_INFINITY);
            vb.total_cmp(&va)
        });
        observer.reordered(self.kind, &self.ids());
    }

    fn sync_empty_state(&mut self) {
        if !self.entries.is_empty() || self.fetch_in_flight {
            self.empty_message = None;
        } else if self.empty_message.is_none() {
            self.empty_message = Some(self.kind.empty_message().to_string());
        }
    }
}
