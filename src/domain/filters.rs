// src/domain/filters.rs

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric fields that can be constrained by a `from`/`to` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RangeField {
    Area,
    KitchenArea,
    LivingArea,
    Rooms,
    Floor,
    TotalFloor,
    CeilingHeight,
}

impl RangeField {
    pub const ALL: [RangeField; 7] = [
        RangeField::Area,
        RangeField::KitchenArea,
        RangeField::LivingArea,
        RangeField::Rooms,
        RangeField::Floor,
        RangeField::TotalFloor,
        RangeField::CeilingHeight,
    ];

    /// Wire prefix; the lookup keys are `<name>_from` / `<name>_to`.
    pub fn name(self) -> &'static str {
        match self {
            RangeField::Area => "area",
            RangeField::KitchenArea => "kitchen_area",
            RangeField::LivingArea => "living_area",
            RangeField::Rooms => "rooms",
            RangeField::Floor => "floor",
            RangeField::TotalFloor => "total_floor",
            RangeField::CeilingHeight => "ceiling_height",
        }
    }
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl Range {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Server-side ordering. Without one the backend returns newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    AreaAsc,
    AreaDesc,
    RoomsAsc,
    RoomsDesc,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::AreaAsc => "area",
            SortKey::AreaDesc => "-area",
            SortKey::RoomsAsc => "rooms",
            SortKey::RoomsDesc => "-rooms",
            SortKey::PriceAsc => "price",
            SortKey::PriceDesc => "-price",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "area" => Some(SortKey::AreaAsc),
            "-area" => Some(SortKey::AreaDesc),
            "rooms" => Some(SortKey::RoomsAsc),
            "-rooms" => Some(SortKey::RoomsDesc),
            "price" => Some(SortKey::PriceAsc),
            "-price" => Some(SortKey::PriceDesc),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum FilterError {
    #[error("invalid range for filter {0}: `to` is below `from`")]
    InvalidRange(RangeField),
}

/// Filter constraints for a search session. Serialised flat, the way the
/// lookup endpoint expects: `state`, `area_from`, `rooms_to`, `details`, ...
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    pub state: Option<String>,
    pub locality: Option<String>,
    pub county: Option<String>,
    pub ranges: BTreeMap<RangeField, Range>,
    pub details: Vec<String>,
    pub order_by: Option<SortKey>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, field: RangeField, from: Option<f64>, to: Option<f64>) -> Self {
        self.set_range(field, from, to);
        self
    }

    pub fn set_range(&mut self, field: RangeField, from: Option<f64>, to: Option<f64>) {
        let range = Range { from, to };
        if range.is_empty() {
            self.ranges.remove(&field);
        } else {
            self.ranges.insert(field, range);
        }
    }

    pub fn range(&self, field: RangeField) -> Range {
        self.ranges.get(&field).copied().unwrap_or_default()
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if !detail.is_empty() {
            self.details.push(detail);
        }
        self
    }
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        for (key, value) in [
            ("state", &self.state),
            ("locality", &self.locality),
            ("county", &self.county),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                map.serialize_entry(key, v)?;
            }
        }

        for (field, range) in &self.ranges {
            if let Some(from) = range.from {
                map.serialize_entry(&format!("{}_from", field.name()), &from)?;
            }
            if let Some(to) = range.to {
                map.serialize_entry(&format!("{}_to", field.name()), &to)?;
            }
        }

        map.serialize_entry("details", &self.details)?;

        if let Some(order) = self.order_by {
            map.serialize_entry("order_by", order.as_str())?;
        }

        map.end()
    }
}
