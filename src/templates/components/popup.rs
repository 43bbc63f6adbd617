use crate::domain::Listing;
use maud::{html, Markup};

/// Groups the integer part in threes with a backtick; a zero fraction is
/// dropped. `1234567.5` -> "1`234`567.5".
pub fn format_price(value: f64) -> String {
    let raw = format!("{value}");
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('`');
        }
        grouped.push(ch);
    }

    match frac_part.filter(|f| f.chars().any(|c| c != '0')) {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn price_or_dash(value: Option<f64>) -> String {
    value.map(format_price).unwrap_or_else(|| "-".to_string())
}

/// Marker popup: price, price per m² and rooms.
pub fn popup_summary(listing: &Listing) -> Markup {
    let details = &listing.details;
    html! {
        "Price : " (price_or_dash(details.price)) " $" br;
        "Price per m² : " (price_or_dash(details.rate)) " $" br;
        "Rooms : " @match details.rooms {
            Some(rooms) => { (rooms) }
            None => { "-" }
        }
    }
}
