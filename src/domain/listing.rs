// src/domain/listing.rs

use crate::client::models::FlatRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a listing. The only field used for equality and dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub i64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a wire record could not become a listing.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum RecordError {
    #[error("flat {0}: missing geolocation")]
    MissingGeolocation(ListingId),

    #[error("flat {0}: missing geometry")]
    MissingGeometry(ListingId),

    #[error("flat {0}: malformed coordinates")]
    MalformedCoordinates(ListingId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in kilometres (spherical law of cosines).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        if self.lat == other.lat && self.lon == other.lon {
            return 0.0;
        }

        let rad_lat1 = self.lat.to_radians();
        let rad_lat2 = other.lat.to_radians();
        let rad_theta = (self.lon - other.lon).to_radians();

        let cos_dist = rad_lat1.sin() * rad_lat2.sin()
            + rad_lat1.cos() * rad_lat2.cos() * rad_theta.cos();

        // nautical minutes -> statute miles -> km
        let degrees = cos_dist.min(1.0).acos().to_degrees();
        degrees * 60.0 * 1.1515 * 1.609344
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub state: Option<String>,
    pub locality: Option<String>,
    pub county: Option<String>,
}

impl Address {
    /// "state, locality, county" with missing parts skipped.
    pub fn line(&self) -> String {
        [&self.state, &self.locality, &self.county]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub feature: String,
    pub value: String,
    pub group: String,
}

/// Display payload. May differ between two fetches of the same listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingDetails {
    pub url: Option<String>,
    pub avatar: Option<String>,
    pub address: Address,

    pub price: Option<f64>,
    pub rate: Option<f64>,
    pub area: Option<f64>,
    pub living_area: Option<f64>,
    pub kitchen_area: Option<f64>,
    pub rooms: Option<i64>,
    pub floor: Option<i64>,
    pub total_floor: Option<i64>,
    pub ceiling_height: Option<f64>,

    pub features: Vec<Feature>,
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub id: ListingId,
    pub coordinates: Coordinates,
    pub details: ListingDetails,
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listing {}

impl Listing {
    pub fn new(id: i64, coordinates: Coordinates) -> Self {
        Self {
            id: ListingId(id),
            coordinates,
            details: ListingDetails::default(),
        }
    }

    /// Flattens a wire record. Only the id and the point coordinates are
    /// structurally required; everything else is carried as optional payload.
    pub fn from_record(record: &FlatRecord) -> Result<Self, RecordError> {
        let id = ListingId(record.id);
        let geolocation = record
            .geolocation
            .as_ref()
            .ok_or(RecordError::MissingGeolocation(id))?;

        let coordinates = geolocation
            .geometry
            .as_ref()
            .map(|g| g.coordinates.as_slice())
            .ok_or(RecordError::MissingGeometry(id))?;

        // GeoJSON order is [lon, lat]
        let (lon, lat) = match coordinates {
            [lon, lat, ..] => (*lon, *lat),
            _ => return Err(RecordError::MalformedCoordinates(id)),
        };

        let address = geolocation
            .properties
            .as_ref()
            .map(|p| Address {
                state: p.state.clone(),
                locality: p.locality.clone(),
                county: p.county.clone(),
            })
            .unwrap_or_default();

        let features = record
            .details
            .iter()
            .map(|d| Feature {
                feature: d.feature.clone(),
                value: d.value.clone(),
                group: d.group.clone(),
            })
            .collect();

        Ok(Self {
            id,
            coordinates: Coordinates::new(lat, lon),
            details: ListingDetails {
                url: record.url.clone(),
                avatar: record.avatar.clone(),
                address,
                price: record.price.map(|n| n.0),
                rate: record.rate.map(|n| n.0),
                area: record.area,
                living_area: record.living_area,
                kitchen_area: record.kitchen_area,
                rooms: record.rooms,
                floor: record.floor,
                total_floor: record.total_floor,
                ceiling_height: record.ceiling_height,
                features,
            },
        })
    }
}
