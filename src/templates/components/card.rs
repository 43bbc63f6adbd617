use crate::domain::Listing;
use crate::engine::CollectionKind;
use crate::templates::components::popup::format_price;
use maud::{html, Markup};

fn action_label(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Saved => "Remove",
        CollectionKind::Search => "Save",
    }
}

pub fn listing_card(kind: CollectionKind, listing: &Listing) -> Markup {
    let details = &listing.details;
    html! {
        div class="obj_example" data-id=(listing.id.0) data-collection=(format!("{kind:?}").to_lowercase()) {
            p class="address" { (details.address.line()) }
            p class="price" {
                b { "Price" } br;
                @match details.price {
                    Some(price) => { (format_price(price)) " $" }
                    None => { "-" }
                }
            }
            p class="area" {
                b { "Area" } br;
                @match details.area {
                    Some(area) => { (area) " m" sup { "2" } }
                    None => { "-" }
                }
            }
            p class="rooms" {
                b { "Rooms" } br;
                @match details.rooms {
                    Some(rooms) => { (rooms) }
                    None => { "-" }
                }
            }
            @if let Some(avatar) = &details.avatar {
                img class="avatar" src=(avatar) alt="";
            }
            button class="buttonAction" { (action_label(kind)) }
            @if let Some(url) = &details.url {
                a class="buttonSource" href=(url) target="_blank" { "Source" }
            }
            button class="buttonShowMap" data-lat=(listing.coordinates.lat) data-lon=(listing.coordinates.lon) { "Map" }
        }
    }
}

pub fn empty_placeholder(message: &str) -> Markup {
    html! {
        p class="message" { (message) }
    }
}

pub fn load_more_button() -> Markup {
    html! {
        button class="paginationButton" { "►" }
    }
}
