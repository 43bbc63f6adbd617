pub mod client;
pub mod client_error;
pub mod models;

pub use client::ApiClient;
pub use client_error::TransportError;

use crate::domain::{FilterSet, Listing, ListingId};

/// One decoded response. `raw_len` is the number of records the server sent,
/// before any record was dropped for being malformed; it decides whether
/// another page may exist.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub raw_len: usize,
    pub listings: Vec<Listing>,
}

/// The request/response contract the engine is driven against.
pub trait Backend: Send + Sync {
    /// `GET /saved/`
    fn fetch_saved(&self) -> Result<Page, TransportError>;

    /// `POST /lookup/flats/` with `filters & { number }`
    fn fetch_page(&self, filters: &FilterSet, number: u32) -> Result<Page, TransportError>;

    /// `PATCH /saved/flats/{id}/`
    fn mark_saved(&self, id: ListingId) -> Result<(), TransportError>;

    /// `DELETE /saved/flats/{id}/`
    fn unmark_saved(&self, id: ListingId) -> Result<(), TransportError>;
}
