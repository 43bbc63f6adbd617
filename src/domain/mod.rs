pub mod filters;
pub mod listing;

pub use filters::{FilterError, FilterSet, RangeField, SortKey};
pub use listing::{Coordinates, Listing, ListingId, RecordError};
