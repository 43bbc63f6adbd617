use crate::client::client::into_page;
use crate::client::models::FlatRecord;
use crate::client::{Backend, Page, TransportError};
use crate::domain::{FilterSet, ListingId};
use crate::driver::execute;
use crate::engine::{BrowseEngine, Command, MemoryMap};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A flat record as the server sends it: GeoJSON `[lon, lat]`, price as a
/// decimal string.
pub fn flat_json(id: i64, lat: f64, lon: f64) -> Value {
    json!({
        "id": id,
        "url": format!("https://flats.example/{id}"),
        "avatar": null,
        "geolocation": {
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lon, lat] },
            "properties": { "state": "Cherkasy", "locality": "Cherkasy", "county": null }
        },
        "price": format!("{}.00", 10_000 + id * 100),
        "rate": null,
        "area": 42.5,
        "living_area": null,
        "kitchen_area": null,
        "rooms": 2,
        "floor": 3,
        "total_floor": 9,
        "ceiling_height": null,
        "details": []
    })
}

pub fn page_of(records: Vec<Value>) -> Page {
    let records: Vec<FlatRecord> = records
        .into_iter()
        .map(|r| serde_json::from_value(r).expect("fixture record should decode"))
        .collect();
    into_page(records)
}

/// `count` records with ids starting at `first`.
pub fn page_range(first: i64, count: usize) -> Page {
    let records = (first..first + count as i64)
        .map(|id| flat_json(id, 49.0 + id as f64 / 1000.0, 32.0))
        .collect();
    page_of(records)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchSaved,
    FetchPage { filters: FilterSet, number: u32 },
    MarkSaved(ListingId),
    UnmarkSaved(ListingId),
}

/// Scripted backend. Pages are served by number; anything unscripted is an
/// empty page.
#[derive(Default)]
pub struct FakeBackend {
    saved: Mutex<Option<Page>>,
    pages: Mutex<HashMap<u32, Page>>,
    failing_pages: Mutex<HashSet<u32>>,
    fail_saved: Mutex<bool>,
    fail_mutations: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_saved(self, page: Page) -> Self {
        *self.saved.lock().unwrap() = Some(page);
        self
    }

    pub fn with_page(self, number: u32, page: Page) -> Self {
        self.pages.lock().unwrap().insert(number, page);
        self
    }

    /// Page `number` fails once, then serves normally.
    pub fn fail_page_once(self, number: u32) -> Self {
        self.failing_pages.lock().unwrap().insert(number);
        self
    }

    pub fn failing_saved(self) -> Self {
        *self.fail_saved.lock().unwrap() = true;
        self
    }

    pub fn failing_mutations(self) -> Self {
        *self.fail_mutations.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::FetchPage { number, .. } => Some(number),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutation_result(&self) -> Result<(), TransportError> {
        if *self.fail_mutations.lock().unwrap() {
            Err(TransportError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl Backend for FakeBackend {
    fn fetch_saved(&self) -> Result<Page, TransportError> {
        self.record(Call::FetchSaved);
        if *self.fail_saved.lock().unwrap() {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    fn fetch_page(&self, filters: &FilterSet, number: u32) -> Result<Page, TransportError> {
        self.record(Call::FetchPage {
            filters: filters.clone(),
            number,
        });
        if self.failing_pages.lock().unwrap().remove(&number) {
            return Err(TransportError::NotJson(Some("text/html".into())));
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    fn mark_saved(&self, id: ListingId) -> Result<(), TransportError> {
        self.record(Call::MarkSaved(id));
        self.mutation_result()
    }

    fn unmark_saved(&self, id: ListingId) -> Result<(), TransportError> {
        self.record(Call::UnmarkSaved(id));
        self.mutation_result()
    }
}

pub fn engine() -> BrowseEngine<MemoryMap> {
    BrowseEngine::new(MemoryMap::new())
}

/// Runs every queued command synchronously, in issue order.
pub fn settle(engine: &mut BrowseEngine<MemoryMap>, backend: &FakeBackend) {
    loop {
        let commands = engine.drain_commands();
        if commands.is_empty() {
            break;
        }
        for command in commands {
            engine.apply(execute(backend, command));
        }
    }
}

/// Takes the queued commands without running them.
pub fn take_commands(engine: &mut BrowseEngine<MemoryMap>) -> Vec<Command> {
    engine.drain_commands()
}
