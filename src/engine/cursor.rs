use crate::domain::{FilterError, FilterSet};
use crate::engine::validator::validate;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Fixed page size of `/lookup/flats/`. A page of exactly this many raw
/// records means another page may exist.
pub const PAGE_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    First,
    Next,
}

/// Identifies one issued page request. Responses are matched back against
/// the single ticket the cursor currently has in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub offset: u32,
    pub phase: FetchPhase,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Idle,
    FetchingFirstPage,
    FetchingNextPage,
    HasMore,
    Exhausted,
    /// Keeps what failed so `retry` can re-issue it.
    Errored { phase: FetchPhase, offset: u32 },
}

impl CursorState {
    pub fn is_fetching(self) -> bool {
        matches!(self, CursorState::FetchingFirstPage | CursorState::FetchingNextPage)
    }
}

/// What a completed page means for the affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    HasMore,
    Exhausted,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("a page fetch is already in flight")]
    FetchInFlight,

    #[error("no further pages to load")]
    NoMorePages,

    #[error("cursor is not in an errored state")]
    NotErrored,

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// The token stored behind the search collection's "load more" control.
/// Stale once a newer session has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMore {
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct PaginationCursor {
    state: CursorState,
    page_offset: u32,
    filters: FilterSet,
    generation: u64,
    in_flight: Option<FetchTicket>,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationCursor {
    pub fn new() -> Self {
        Self {
            state: CursorState::Idle,
            page_offset: 0,
            filters: FilterSet::default(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Offset of the most recently issued page.
    pub fn page_offset(&self) -> u32 {
        self.page_offset
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// Validates, then starts a fresh session at offset 0. Any request of an
    /// older session still in flight becomes stale.
    pub fn start_new_search(&mut self, filters: FilterSet) -> Result<FetchTicket, CursorError> {
        validate(&filters)?;

        self.generation += 1;
        self.page_offset = 0;
        self.filters = filters;
        self.state = CursorState::FetchingFirstPage;

        Ok(self.issue(FetchPhase::First))
    }

    /// Only legal from `HasMore`. The offset is consumed here, at request
    /// time, so it stays monotonic however slowly the response arrives.
    pub fn load_next_page(&mut self) -> Result<FetchTicket, CursorError> {
        match self.state {
            CursorState::HasMore => {}
            CursorState::FetchingFirstPage | CursorState::FetchingNextPage => {
                return Err(CursorError::FetchInFlight)
            }
            _ => return Err(CursorError::NoMorePages),
        }

        self.page_offset += 1;
        self.state = CursorState::FetchingNextPage;
        Ok(self.issue(FetchPhase::Next))
    }

    /// Re-issues the page that failed, within the same session.
    pub fn retry(&mut self) -> Result<FetchTicket, CursorError> {
        let CursorState::Errored { phase, offset } = self.state else {
            return Err(CursorError::NotErrored);
        };

        self.page_offset = offset;
        self.state = match phase {
            FetchPhase::First => CursorState::FetchingFirstPage,
            FetchPhase::Next => CursorState::FetchingNextPage,
        };
        Ok(self.issue(phase))
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.in_flight.as_ref() == Some(ticket)
    }

    /// Records a successful response. `None` means the ticket is stale and
    /// nothing was changed.
    pub fn complete(&mut self, ticket: &FetchTicket, raw_len: usize) -> Option<PageVerdict> {
        if !self.is_current(ticket) {
            return None;
        }
        self.in_flight = None;

        let verdict = if raw_len == PAGE_CAPACITY {
            self.state = CursorState::HasMore;
            PageVerdict::HasMore
        } else {
            self.state = CursorState::Exhausted;
            PageVerdict::Exhausted
        };

        debug!(
            generation = ticket.generation,
            offset = ticket.offset,
            raw_len,
            ?verdict,
            "page completed"
        );
        Some(verdict)
    }

    /// Records a transport failure. Returns false for stale tickets.
    pub fn fail(&mut self, ticket: &FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = None;
        self.state = CursorState::Errored {
            phase: ticket.phase,
            offset: ticket.offset,
        };
        true
    }

    fn issue(&mut self, phase: FetchPhase) -> FetchTicket {
        let ticket = FetchTicket {
            generation: self.generation,
            offset: self.page_offset,
            phase,
            issued_at: Utc::now(),
        };
        debug!(
            generation = ticket.generation,
            offset = ticket.offset,
            ?phase,
            "page requested"
        );
        self.in_flight = Some(ticket.clone());
        ticket
    }
}
