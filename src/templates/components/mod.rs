pub mod card;
pub mod popup;

pub use card::{empty_placeholder, listing_card, load_more_button};
pub use popup::{format_price, popup_summary};
