// templates/pages/browse.rs

use crate::engine::{BrowseEngine, CollectionKind, MapSurface};
use crate::templates::components::{empty_placeholder, load_more_button};
use crate::templates::desktop_layout;
use crate::templates::view::CardView;
use maud::{html, Markup};

fn holder<M: MapSurface>(engine: &BrowseEngine<M>, view: &CardView, kind: CollectionKind) -> Markup {
    let collection = engine.collection(kind);
    html! {
        @for card in view.cards(kind) {
            (card.markup)
        }
        @if let Some(message) = collection.empty_message() {
            (empty_placeholder(message))
        }
        @if collection.load_more().is_some() {
            (load_more_button())
        }
    }
}

/// Both collections side by side, in display order.
pub fn browse_page<M: MapSurface>(engine: &BrowseEngine<M>, view: &CardView) -> Markup {
    desktop_layout(
        "Flats",
        html! {
            main class="container" {
                section id="div_saves" class="card" {
                    h3 { "Saved (" (engine.saved().len()) ")" }
                    (holder(engine, view, CollectionKind::Saved))
                }
                section id="div_search" class="card" {
                    h3 { "Search (" (engine.search().len()) ")" }
                    (holder(engine, view, CollectionKind::Search))
                }
            }
        },
    )
}
