// client.rs
use crate::client::models::{
    FlatRecord, GeoSuggestion, GeoUnit, PageQuery, SavedResponse, Summary,
};
use crate::client::{Backend, Page, TransportError};
use crate::config::Config;
use crate::domain::{FilterSet, Listing, ListingId};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("flat_scout/", env!("CARGO_PKG_VERSION"));

pub struct ApiClient {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|e| TransportError::Config(format!("bad endpoint {path}: {e}")))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("JWT {token}")),
            None => builder,
        }
    }

    /// `GET /summary/`
    pub fn summary(&self) -> Result<Summary, TransportError> {
        let resp = self.client.get(self.endpoint("summary/")?).send()?;
        read_json(resp)
    }

    /// `GET /geolocation-autocomplete/`, reduced to the distinct values of
    /// `unit` in first-seen order.
    pub fn geolocation_autocomplete(
        &self,
        prefix: &GeoSuggestion,
        unit: GeoUnit,
    ) -> Result<Vec<String>, TransportError> {
        let mut params = Vec::new();
        for (key, value) in [
            ("state", &prefix.state),
            ("locality", &prefix.locality),
            ("county", &prefix.county),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((key, v));
            }
        }

        let resp = self
            .authorized(self.client.get(self.endpoint("geolocation-autocomplete/")?))
            .query(&params)
            .send()?;

        let rows: Vec<GeoSuggestion> = read_json(resp)?;
        Ok(distinct_units(&rows, unit))
    }

    /// `GET /detail-autocomplete/?value=..`
    pub fn detail_autocomplete(&self, value: &str) -> Result<Vec<String>, TransportError> {
        let resp = self
            .authorized(self.client.get(self.endpoint("detail-autocomplete/")?))
            .query(&[("value", value)])
            .send()?;

        read_json(resp)
    }

    fn saved_flat_url(&self, id: ListingId) -> Result<Url, TransportError> {
        self.endpoint(&format!("saved/flats/{id}/"))
    }
}

impl Backend for ApiClient {
    fn fetch_saved(&self) -> Result<Page, TransportError> {
        let resp = self
            .authorized(self.client.get(self.endpoint("saved/")?))
            .send()?;

        let body: SavedResponse = read_json(resp)?;
        Ok(into_page(body.saved_flats))
    }

    fn fetch_page(&self, filters: &FilterSet, number: u32) -> Result<Page, TransportError> {
        let query = PageQuery { filters, number };
        debug!(number, "POST lookup/flats/");

        let resp = self
            .authorized(self.client.post(self.endpoint("lookup/flats/")?))
            .json(&query)
            .send()?;

        let records: Vec<FlatRecord> = read_json(resp)?;
        Ok(into_page(records))
    }

    fn mark_saved(&self, id: ListingId) -> Result<(), TransportError> {
        let resp = self
            .authorized(self.client.patch(self.saved_flat_url(id)?))
            .send()?;
        expect_success(resp)
    }

    fn unmark_saved(&self, id: ListingId) -> Result<(), TransportError> {
        let resp = self
            .authorized(self.client.delete(self.saved_flat_url(id)?))
            .send()?;
        expect_success(resp)
    }
}

fn expect_success(resp: Response) -> Result<(), TransportError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}

fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let text = resp.text()?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    match content_type {
        Some(ct) if ct.contains("application/json") => {}
        other => return Err(TransportError::NotJson(other)),
    }

    serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Keeps the raw record count; drops records the engine cannot place on a map.
/// Both autocomplete endpoints are only asked on a non-empty input of even
/// length, counted in characters.
pub fn should_suggest(input: &str) -> bool {
    let len = input.chars().count();
    len != 0 && len % 2 == 0
}

pub fn into_page(records: Vec<FlatRecord>) -> Page {
    let raw_len = records.len();
    let listings = records
        .iter()
        .filter_map(|record| match Listing::from_record(record) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Skipping record: {e}");
                None
            }
        })
        .collect();

    Page { raw_len, listings }
}

pub fn distinct_units(rows: &[GeoSuggestion], unit: GeoUnit) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| unit.pick(row))
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect()
}
