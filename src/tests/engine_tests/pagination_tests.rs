// src/tests/engine_tests/pagination_tests.rs

use crate::domain::{FilterError, FilterSet, ListingId, RangeField};
use crate::driver::execute;
use crate::engine::cursor::{FetchPhase, PAGE_CAPACITY};
use crate::engine::session::PageApplied;
use crate::engine::{CollectionKind, Command, CursorState, Notice};
use crate::tests::utils::{engine, flat_json, page_of, page_range, settle, take_commands, FakeBackend};
use serde_json::json;
use std::collections::HashSet;

#[test]
fn second_page_with_duplicates_appends_only_new_listings() {
    // page 0: ids 1..=20, page 1: ids 19..=23
    let backend = FakeBackend::new()
        .with_page(0, page_range(1, PAGE_CAPACITY))
        .with_page(1, page_range(19, 5));
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);
    assert_eq!(engine.search().len(), 20);
    assert!(engine.search().load_more().is_some());

    assert!(engine.load_more());
    settle(&mut engine, &backend);

    let ids = engine.search().ids();
    assert_eq!(ids.len(), 23);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 23);
    assert_eq!(ids.last(), Some(&ListingId(23)));
    assert!(engine.search().load_more().is_none());
    assert_eq!(engine.cursor().state(), CursorState::Exhausted);
    assert_eq!(backend.page_numbers(), vec![0, 1]);
}

#[test]
fn short_first_page_offers_no_more() {
    let backend = FakeBackend::new().with_page(0, page_range(1, 7));
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    assert_eq!(engine.search().len(), 7);
    assert!(engine.search().load_more().is_none());
    assert!(!engine.load_more());
    assert_eq!(backend.page_numbers(), vec![0]);
}

#[test]
fn full_page_of_raw_records_keeps_affordance_even_if_one_is_malformed() {
    let mut records: Vec<_> = (1..=19).map(|id| flat_json(id, 49.0, 32.0)).collect();
    records.push(json!({ "id": 99, "geolocation": null, "details": [] }));
    let backend = FakeBackend::new().with_page(0, page_of(records));
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    assert_eq!(engine.search().len(), 19);
    assert!(!engine.search().contains(ListingId(99)));
    assert!(engine.search().load_more().is_some());
}

#[test]
fn empty_first_page_shows_placeholder() {
    let backend = FakeBackend::new();
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    assert_eq!(engine.search().empty_message(), None);
    settle(&mut engine, &backend);

    assert!(engine.search().is_empty());
    assert_eq!(engine.search().empty_message(), Some("[ nothing found ]"));
    assert_eq!(engine.cursor().state(), CursorState::Exhausted);
}

#[test]
fn new_search_clears_everything_before_any_response() {
    let backend = FakeBackend::new().with_page(0, page_range(1, PAGE_CAPACITY));
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);
    assert!(engine.load_more());
    let in_flight = take_commands(&mut engine);

    let narrower = FilterSet::new().with_range(RangeField::Rooms, Some(1.0), Some(2.0));
    engine.start_new_search(narrower.clone()).unwrap();

    // synchronous reset, nothing has come back yet
    assert!(engine.search().is_empty());
    assert!(engine.search().index().is_empty());
    assert_eq!(engine.overlay().marker_count(CollectionKind::Search), 0);
    assert!(engine.search().load_more().is_none());
    assert_eq!(engine.cursor().page_offset(), 0);
    assert_eq!(engine.cursor().filters(), &narrower);

    // the old page-1 request settles late and is dropped
    for command in in_flight {
        engine.apply(execute(&backend, command));
    }
    assert!(engine.search().is_empty());

    settle(&mut engine, &backend);
    assert_eq!(engine.search().len(), 20);
}

#[test]
fn stale_page_is_discarded_without_touching_state() {
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    let Some(Command::FetchPage { ticket: old, .. }) = take_commands(&mut engine).pop() else {
        panic!("expected a page request");
    };

    engine.start_new_search(FilterSet::new()).unwrap();
    let applied = engine.apply_page(&old, Ok(page_range(500, 3)));

    assert_eq!(applied, PageApplied::Stale);
    assert!(engine.search().is_empty());
    assert!(engine.search().fetch_in_flight());
    assert_eq!(engine.search().empty_message(), None);
    assert_eq!(engine.cursor().state(), CursorState::FetchingFirstPage);
}

#[test]
fn load_more_is_refused_while_a_page_is_in_flight() {
    let backend = FakeBackend::new()
        .with_page(0, page_range(1, PAGE_CAPACITY))
        .with_page(1, page_range(21, PAGE_CAPACITY));
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    assert!(engine.load_more());
    assert!(!engine.load_more());
    assert_eq!(take_commands(&mut engine).len(), 1);
    assert_eq!(engine.cursor().page_offset(), 1);
}

#[test]
fn invalid_range_issues_nothing() {
    let backend = FakeBackend::new().with_page(0, page_range(1, 3));
    let mut engine = engine();
    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    let bad = FilterSet::new().with_range(RangeField::Area, Some(900.0), Some(100.0));
    let err = engine.start_new_search(bad).unwrap_err();

    assert_eq!(err, FilterError::InvalidRange(RangeField::Area));
    assert!(take_commands(&mut engine).is_empty());
    assert_eq!(engine.search().len(), 3);
    assert_eq!(engine.cursor().generation(), 1);
    assert_eq!(
        engine.drain_notices(),
        vec![Notice::InvalidRange(RangeField::Area)]
    );
}

#[test]
fn filters_reach_the_backend_unchanged() {
    let backend = FakeBackend::new();
    let mut engine = engine();
    let filters = FilterSet {
        state: Some("Cherkasy".into()),
        ..FilterSet::new()
    }
    .with_range(RangeField::Area, Some(30.0), None)
    .with_detail("Balcony");

    engine.start_new_search(filters.clone()).unwrap();
    settle(&mut engine, &backend);

    assert_eq!(
        backend.calls(),
        vec![crate::tests::utils::Call::FetchPage { filters, number: 0 }]
    );
}

#[test]
fn failed_next_page_can_be_retried_at_the_same_offset() {
    let backend = FakeBackend::new()
        .with_page(0, page_range(1, PAGE_CAPACITY))
        .with_page(1, page_range(21, 4))
        .fail_page_once(1);
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);
    engine.load_more();
    settle(&mut engine, &backend);

    assert_eq!(
        engine.cursor().state(),
        CursorState::Errored { phase: FetchPhase::Next, offset: 1 }
    );
    assert!(engine.search().load_more().is_none());
    assert_eq!(engine.search().len(), 20);
    assert_eq!(
        engine.drain_notices(),
        vec![Notice::FetchFailed(CollectionKind::Search)]
    );

    assert!(engine.retry_search());
    settle(&mut engine, &backend);

    assert_eq!(engine.search().len(), 24);
    assert_eq!(engine.cursor().state(), CursorState::Exhausted);
    assert_eq!(backend.page_numbers(), vec![0, 1, 1]);
    assert!(!engine.retry_search());
}

#[test]
fn failed_first_page_on_empty_collection_shows_placeholder_only() {
    let backend = FakeBackend::new().fail_page_once(0);
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    assert_eq!(
        engine.cursor().state(),
        CursorState::Errored { phase: FetchPhase::First, offset: 0 }
    );
    assert_eq!(engine.search().empty_message(), Some("[ nothing found ]"));
    assert!(engine.drain_notices().is_empty());
}

#[test]
fn repeated_id_within_one_page_lands_once() {
    let page = page_of(vec![
        flat_json(1, 49.44, 32.06),
        flat_json(1, 49.44, 32.06),
        flat_json(2, 49.45, 32.07),
    ]);
    let backend = FakeBackend::new().with_page(0, page);
    let mut engine = engine();

    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    assert_eq!(engine.search().ids(), vec![ListingId(1), ListingId(2)]);
    assert_eq!(engine.search().index().len(), 2);
    assert_eq!(engine.overlay().marker_count(CollectionKind::Search), 2);
    assert_eq!(
        engine
            .overlay()
            .surface()
            .markers_in(CollectionKind::Search.layer())
            .len(),
        2
    );
}
