pub mod components;
pub mod layouts;
pub mod pages;
pub mod view;

// Re-exports for convenience
pub use components::{format_price, popup_summary};
pub use layouts::desktop::desktop_layout;
pub use view::CardView;
