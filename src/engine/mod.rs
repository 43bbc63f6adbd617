pub mod collection;
pub mod cursor;
pub mod dedup;
pub mod gateway;
pub mod map;
pub mod markers;
pub mod session;
pub mod validator;

pub use collection::{CollectionKind, CollectionObserver, LocalSort};
pub use cursor::CursorState;
pub use gateway::MutationKind;
pub use map::MemoryMap;
pub use markers::{LayerId, MapSurface};
pub use session::{BrowseEngine, Command, Completion};

use crate::domain::{ListingId, RangeField};

/// Informational messages for the user, drained by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved(ListingId),
    AlreadySaved(ListingId),
    InvalidRange(RangeField),
    FetchFailed(CollectionKind),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Saved(_) => "Saved!".to_string(),
            Notice::AlreadySaved(_) => "This item has already been saved!".to_string(),
            Notice::InvalidRange(field) => format!("Some troubles in filter {field}"),
            Notice::FetchFailed(CollectionKind::Saved) => "Could not load saves".to_string(),
            Notice::FetchFailed(CollectionKind::Search) => "Could not load results".to_string(),
        }
    }
}
