use crate::client::TransportError;
use crate::domain::{Listing, ListingId};
use crate::engine::collection::{CollectionKind, CollectionObserver, ListingCollection};
use crate::engine::Notice;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// `PATCH /saved/flats/{id}/`
    MarkSaved,
    /// `DELETE /saved/flats/{id}/`
    UnmarkSaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub kind: MutationKind,
    pub id: ListingId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Applied(Mutation),
    AlreadySaved,
}

/// Optimistic save/remove against the saved collection. The local change is
/// applied immediately and never rolled back; the server call is only
/// reported once it settles.
#[derive(Debug, Default)]
pub struct MutationGateway {
    pending: usize,
    unconfirmed: Vec<Mutation>,
}

impl MutationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save<A: Clone>(
        &mut self,
        saved: &mut ListingCollection<A>,
        listing: Listing,
        observer: &mut dyn CollectionObserver,
    ) -> SaveOutcome {
        debug_assert_eq!(saved.kind(), CollectionKind::Saved);

        let id = listing.id;
        if !saved.add_listing(listing, observer) {
            debug!(%id, "save ignored, already saved");
            return SaveOutcome::AlreadySaved;
        }

        self.pending += 1;
        SaveOutcome::Applied(Mutation {
            kind: MutationKind::MarkSaved,
            id,
        })
    }

    /// `None` when the id was not in the saved collection.
    pub fn remove<A: Clone>(
        &mut self,
        saved: &mut ListingCollection<A>,
        id: ListingId,
        observer: &mut dyn CollectionObserver,
    ) -> Option<Mutation> {
        debug_assert_eq!(saved.kind(), CollectionKind::Saved);

        saved.remove_listing(id, observer)?;
        self.pending += 1;
        Some(Mutation {
            kind: MutationKind::UnmarkSaved,
            id,
        })
    }

    /// Settles a server mutation. Failures are logged and remembered but
    /// never surfaced or rolled back.
    pub fn confirm(
        &mut self,
        mutation: Mutation,
        result: Result<(), TransportError>,
    ) -> Option<Notice> {
        self.pending = self.pending.saturating_sub(1);

        match result {
            Ok(()) => match mutation.kind {
                MutationKind::MarkSaved => Some(Notice::Saved(mutation.id)),
                MutationKind::UnmarkSaved => None,
            },
            Err(e) => {
                warn!(id = %mutation.id, kind = ?mutation.kind, "mutation unconfirmed: {e}");
                self.unconfirmed.push(mutation);
                None
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Mutations whose server call failed; local state already reflects them.
    pub fn unconfirmed(&self) -> &[Mutation] {
        &self.unconfirmed
    }
}
