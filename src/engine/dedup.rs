use crate::domain::ListingId;
use std::collections::HashSet;

/// Identifiers already materialised in one collection.
#[derive(Debug, Default, Clone)]
pub struct DedupIndex {
    ids: HashSet<ListingId>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: ListingId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns false if the id was already present.
    pub fn add(&mut self, id: ListingId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: ListingId) -> bool {
        self.ids.remove(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
