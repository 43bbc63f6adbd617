use crate::domain::FilterSet;
use serde::{Deserialize, Deserializer, Serialize};

// flat
//  ├── id
//  ├── url / avatar
//  ├── geolocation            (GeoJSON Feature)
//  │    ├── geometry
//  │    │    └── coordinates  [lon, lat]
//  │    └── properties
//  │         ├── state
//  │         ├── locality
//  │         └── county
//  ├── price / rate           (decimal, may arrive as a string)
//  ├── area / living_area / kitchen_area / ceiling_height
//  ├── rooms / floor / total_floor
//  └── details[]
//       ├── feature
//       ├── value
//       └── group

#[derive(Debug, Deserialize)]
pub struct FlatRecord {
    pub id: i64,
    pub url: Option<String>,
    pub avatar: Option<String>,
    pub geolocation: Option<GeoFeature>,

    pub price: Option<WireDecimal>,
    pub rate: Option<WireDecimal>,
    pub area: Option<f64>,
    pub living_area: Option<f64>,
    pub kitchen_area: Option<f64>,
    pub rooms: Option<i64>,
    pub floor: Option<i64>,
    pub total_floor: Option<i64>,
    pub ceiling_height: Option<f64>,

    #[serde(default)]
    pub details: Vec<DetailRecord>,
}

#[derive(Debug, Deserialize)]
pub struct GeoFeature {
    pub geometry: Option<Geometry>,
    pub properties: Option<GeoProperties>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct GeoProperties {
    pub state: Option<String>,
    pub locality: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailRecord {
    pub feature: String,
    pub value: String,
    pub group: String,
}

/// DRF renders decimal fields as strings ("25000.00"); accept both forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireDecimal(pub f64);

impl<'de> Deserialize<'de> for WireDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(WireDecimal(n)),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(WireDecimal)
                .map_err(|_| serde::de::Error::custom(format!("not a decimal: {s:?}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SavedResponse {
    pub saved_flats: Vec<FlatRecord>,
}

#[derive(Debug, Serialize)]
pub struct PageQuery<'a> {
    #[serde(flatten)]
    pub filters: &'a FilterSet,
    pub number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Summary {
    pub total_flats: u64,
}

/// One row of `/geolocation-autocomplete/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoSuggestion {
    pub state: Option<String>,
    pub locality: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoUnit {
    State,
    Locality,
    County,
}

impl GeoUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "state" => Some(GeoUnit::State),
            "locality" => Some(GeoUnit::Locality),
            "county" => Some(GeoUnit::County),
            _ => None,
        }
    }

    pub fn pick<'a>(self, row: &'a GeoSuggestion) -> Option<&'a str> {
        match self {
            GeoUnit::State => row.state.as_deref(),
            GeoUnit::Locality => row.locality.as_deref(),
            GeoUnit::County => row.county.as_deref(),
        }
    }
}
