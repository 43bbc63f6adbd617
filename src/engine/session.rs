use crate::client::{Page, TransportError};
use crate::domain::{Coordinates, FilterError, FilterSet, Listing, ListingId};
use crate::engine::collection::{CollectionKind, CollectionObserver, ListingCollection, LocalSort};
use crate::engine::cursor::{
    CursorError, FetchPhase, FetchTicket, LoadMore, PageVerdict, PaginationCursor,
};
use crate::engine::gateway::{Mutation, MutationGateway, SaveOutcome};
use crate::engine::markers::{LayerId, MapSurface, MarkerHandle, MarkerOverlay};
use crate::engine::Notice;
use chrono::Utc;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Network work the engine wants done. Drained and executed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchSaved,
    FetchPage { ticket: FetchTicket, filters: FilterSet },
    Mutate(Mutation),
}

/// A settled network call, fed back into the engine on the loop thread.
#[derive(Debug)]
pub enum Completion {
    Saved(Result<Page, TransportError>),
    Page {
        ticket: FetchTicket,
        result: Result<Page, TransportError>,
    },
    Mutation {
        mutation: Mutation,
        result: Result<(), TransportError>,
    },
}

/// What applying a page completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageApplied {
    /// `added` counts listings that were new to the collection.
    Applied { added: usize, verdict: PageVerdict },
    Failed,
    Stale,
}

/// Sends each collection event to the marker overlay first, then to views.
struct Fanout<'a, M: MapSurface> {
    overlay: &'a mut MarkerOverlay<M>,
    views: &'a mut [Box<dyn CollectionObserver>],
}

impl<M: MapSurface> CollectionObserver for Fanout<'_, M> {
    fn entry_added(&mut self, kind: CollectionKind, listing: &Listing) {
        self.overlay.entry_added(kind, listing);
        for view in self.views.iter_mut() {
            view.entry_added(kind, listing);
        }
    }

    fn entry_removed(&mut self, kind: CollectionKind, id: ListingId) {
        self.overlay.entry_removed(kind, id);
        for view in self.views.iter_mut() {
            view.entry_removed(kind, id);
        }
    }

    fn cleared(&mut self, kind: CollectionKind) {
        self.overlay.cleared(kind);
        for view in self.views.iter_mut() {
            view.cleared(kind);
        }
    }

    fn reordered(&mut self, kind: CollectionKind, order: &[ListingId]) {
        self.overlay.reordered(kind, order);
        for view in self.views.iter_mut() {
            view.reordered(kind, order);
        }
    }
}

/// The browsing session: both collections, the search cursor, the marker
/// overlay and the mutation gateway, mutated only through the methods below.
/// Performs no I/O; see `Command` and `Completion`.
pub struct BrowseEngine<M: MapSurface> {
    saved: ListingCollection<LoadMore>,
    search: ListingCollection<LoadMore>,
    cursor: PaginationCursor,
    overlay: MarkerOverlay<M>,
    gateway: MutationGateway,
    views: Vec<Box<dyn CollectionObserver>>,
    outbox: VecDeque<Command>,
    notices: Vec<Notice>,
}

impl<M: MapSurface> BrowseEngine<M> {
    pub fn new(surface: M) -> Self {
        Self {
            saved: ListingCollection::new(CollectionKind::Saved),
            search: ListingCollection::new(CollectionKind::Search),
            cursor: PaginationCursor::new(),
            overlay: MarkerOverlay::new(surface),
            gateway: MutationGateway::new(),
            views: Vec::new(),
            outbox: VecDeque::new(),
            notices: Vec::new(),
        }
    }

    /// Registers a rendering layer. It receives every event after the
    /// marker overlay has.
    pub fn subscribe(&mut self, view: Box<dyn CollectionObserver>) {
        self.views.push(view);
    }

    pub fn saved(&self) -> &ListingCollection<LoadMore> {
        &self.saved
    }

    pub fn search(&self) -> &ListingCollection<LoadMore> {
        &self.search
    }

    pub fn collection(&self, kind: CollectionKind) -> &ListingCollection<LoadMore> {
        match kind {
            CollectionKind::Saved => &self.saved,
            CollectionKind::Search => &self.search,
        }
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn overlay(&self) -> &MarkerOverlay<M> {
        &self.overlay
    }

    pub fn gateway(&self) -> &MutationGateway {
        &self.gateway
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.outbox.drain(..).collect()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Requests the saved collection. Ignored while that fetch is pending.
    pub fn load_saved(&mut self) {
        if self.saved.fetch_in_flight() {
            debug!("saved fetch already in flight");
            return;
        }
        self.saved.begin_fetch();
        self.outbox.push_back(Command::FetchSaved);
    }

    /// Validates the filters, then resets the search collection, its markers
    /// and the cursor in one step before issuing page 0. An invalid range
    /// issues nothing.
    pub fn start_new_search(&mut self, filters: FilterSet) -> Result<(), FilterError> {
        let ticket = match self.cursor.start_new_search(filters) {
            Ok(ticket) => ticket,
            Err(CursorError::Filter(e)) => {
                let FilterError::InvalidRange(field) = e;
                self.notices.push(Notice::InvalidRange(field));
                return Err(e);
            }
            Err(e) => {
                debug!("search not started: {e}");
                return Ok(());
            }
        };

        let mut fanout = Fanout {
            overlay: &mut self.overlay,
            views: &mut self.views,
        };
        self.search.clear(&mut fanout);
        self.search.begin_fetch();

        self.outbox.push_back(Command::FetchPage {
            ticket,
            filters: self.cursor.filters().clone(),
        });
        Ok(())
    }

    /// Activates the search collection's "load more" control. Returns whether
    /// a page request was issued.
    pub fn load_more(&mut self) -> bool {
        if self.cursor.state().is_fetching() {
            debug!("page fetch already in flight");
            return false;
        }
        let Some(action) = self.search.activate_load_more() else {
            return false;
        };
        // a new session clears the control before issuing its first page
        debug_assert_eq!(action.generation, self.cursor.generation());

        match self.cursor.load_next_page() {
            Ok(ticket) => {
                self.search.clear_load_more();
                self.search.begin_fetch();
                self.outbox.push_back(Command::FetchPage {
                    ticket,
                    filters: self.cursor.filters().clone(),
                });
                true
            }
            Err(e) => {
                debug!("load more refused: {e}");
                false
            }
        }
    }

    /// Re-issues the page that failed. Returns whether a request was issued.
    pub fn retry_search(&mut self) -> bool {
        match self.cursor.retry() {
            Ok(ticket) => {
                self.search.begin_fetch();
                self.outbox.push_back(Command::FetchPage {
                    ticket,
                    filters: self.cursor.filters().clone(),
                });
                true
            }
            Err(e) => {
                debug!("retry refused: {e}");
                false
            }
        }
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Saved(result) => self.apply_saved(result),
            Completion::Page { ticket, result } => {
                self.apply_page(&ticket, result);
            }
            Completion::Mutation { mutation, result } => {
                if let Some(notice) = self.gateway.confirm(mutation, result) {
                    self.notices.push(notice);
                }
            }
        }
    }

    pub fn apply_saved(&mut self, result: Result<Page, TransportError>) {
        let mut fanout = Fanout {
            overlay: &mut self.overlay,
            views: &mut self.views,
        };

        match result {
            Ok(page) => {
                let raw = page.raw_len;
                let mut added = 0;
                for listing in page.listings {
                    if self.saved.add_listing(listing, &mut fanout) {
                        added += 1;
                    }
                }
                info!(raw, added, "saved flats loaded");
            }
            Err(e) => {
                warn!("saved fetch failed: {e}");
                if !self.saved.is_empty() {
                    self.notices.push(Notice::FetchFailed(CollectionKind::Saved));
                }
            }
        }

        self.saved.end_fetch();
    }

    pub fn apply_page(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Page, TransportError>,
    ) -> PageApplied {
        if !self.cursor.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                offset = ticket.offset,
                current = self.cursor.generation(),
                "discarding stale page response"
            );
            return PageApplied::Stale;
        }

        let elapsed_ms = (Utc::now() - ticket.issued_at).num_milliseconds();

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(offset = ticket.offset, elapsed_ms, "page fetch failed: {e}");
                self.cursor.fail(ticket);
                self.search.clear_load_more();
                self.search.end_fetch();
                if !self.search.is_empty() {
                    self.notices.push(Notice::FetchFailed(CollectionKind::Search));
                }
                return PageApplied::Failed;
            }
        };

        let Some(verdict) = self.cursor.complete(ticket, page.raw_len) else {
            return PageApplied::Stale;
        };

        let raw = page.raw_len;
        let mut fanout = Fanout {
            overlay: &mut self.overlay,
            views: &mut self.views,
        };
        let mut added = 0;
        for listing in page.listings {
            if self.search.add_listing(listing, &mut fanout) {
                added += 1;
            }
        }

        match verdict {
            PageVerdict::HasMore => self.search.set_load_more(LoadMore {
                generation: ticket.generation,
            }),
            PageVerdict::Exhausted => self.search.clear_load_more(),
        }
        self.search.end_fetch();

        if ticket.phase == FetchPhase::First && self.search.is_empty() {
            debug!("first page produced nothing");
        }

        info!(
            offset = ticket.offset,
            raw,
            added,
            total = self.search.len(),
            elapsed_ms,
            "search page applied"
        );
        PageApplied::Applied { added, verdict }
    }

    /// Optimistically saves a listing and queues the server call.
    pub fn save(&mut self, listing: Listing) {
        let id = listing.id;
        let mut fanout = Fanout {
            overlay: &mut self.overlay,
            views: &mut self.views,
        };

        match self.gateway.save(&mut self.saved, listing, &mut fanout) {
            SaveOutcome::Applied(mutation) => self.outbox.push_back(Command::Mutate(mutation)),
            SaveOutcome::AlreadySaved => self.notices.push(Notice::AlreadySaved(id)),
        }
    }

    /// Saves a listing currently shown in the search results.
    pub fn save_from_search(&mut self, id: ListingId) -> bool {
        match self.search.get(id).cloned() {
            Some(listing) => {
                self.save(listing);
                true
            }
            None => false,
        }
    }

    /// Optimistically removes a saved listing and queues the server call.
    pub fn remove(&mut self, id: ListingId) -> bool {
        let mut fanout = Fanout {
            overlay: &mut self.overlay,
            views: &mut self.views,
        };

        match self.gateway.remove(&mut self.saved, id, &mut fanout) {
            Some(mutation) => {
                self.outbox.push_back(Command::Mutate(mutation));
                true
            }
            None => false,
        }
    }

    /// Reorders one collection's cards locally, highest value first.
    pub fn sort(&mut self, kind: CollectionKind, key: LocalSort) {
        let mut fanout = Fanout {
            overlay: &mut self.overlay,
            views: &mut self.views,
        };
        match kind {
            CollectionKind::Saved => self.saved.sort_by(key, &mut fanout),
            CollectionKind::Search => self.search.sort_by(key, &mut fanout),
        }
    }

    /// Marker double-activation: which card to bring into view.
    pub fn activate_marker(&self, handle: MarkerHandle) -> Option<(CollectionKind, ListingId)> {
        self.overlay.listing_for(handle)
    }

    /// Card "show on map": focuses the listing's marker.
    pub fn show_on_map(&mut self, kind: CollectionKind, id: ListingId) -> Option<MarkerHandle> {
        self.overlay.show_listing(kind, id)
    }

    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) {
        self.overlay.set_layer_visible(layer, visible);
    }

    /// Map click: moves the search circle, or stretches it when `stretch`
    /// (ctrl-click) is set.
    pub fn map_clicked(&mut self, at: Coordinates, stretch: bool) -> bool {
        if stretch {
            self.overlay.stretch_circle(at)
        } else {
            self.overlay.place_circle(at)
        }
    }
}
