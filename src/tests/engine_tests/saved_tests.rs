// src/tests/engine_tests/saved_tests.rs

use crate::domain::{FilterSet, ListingId};
use crate::engine::gateway::Mutation;
use crate::engine::{CollectionKind, Command, LayerId, MutationKind, Notice};
use crate::tests::utils::{
    engine, flat_json, page_of, page_range, settle, take_commands, Call, FakeBackend,
};

#[test]
fn saved_listing_lands_with_marker_at_its_coordinates() {
    let backend = FakeBackend::new().with_saved(page_of(vec![flat_json(1, 49.44, 32.06)]));
    let mut engine = engine();

    engine.load_saved();
    settle(&mut engine, &backend);

    let saved = engine.saved();
    assert_eq!(saved.ids(), vec![ListingId(1)]);
    assert_eq!(saved.empty_message(), None);

    let listing = saved.get(ListingId(1)).unwrap();
    assert_eq!(listing.coordinates.lat, 49.44);
    assert_eq!(listing.coordinates.lon, 32.06);
    assert_eq!(listing.details.price, Some(10_100.0));

    let marker = engine
        .overlay()
        .marker_for(CollectionKind::Saved, ListingId(1))
        .unwrap();
    assert_eq!(marker.at, listing.coordinates);
    assert_eq!(engine.overlay().surface().markers_in(LayerId::Saved).len(), 1);
    assert!(!engine.overlay().is_layer_visible(LayerId::Saved));
}

#[test]
fn no_saves_shows_placeholder() {
    let backend = FakeBackend::new();
    let mut engine = engine();

    engine.load_saved();
    assert_eq!(engine.saved().empty_message(), None);
    settle(&mut engine, &backend);

    assert_eq!(engine.saved().empty_message(), Some("[ no saves ]"));
}

#[test]
fn save_then_remove_round_trips_placeholder_and_marker() {
    let backend = FakeBackend::new().with_page(0, page_of(vec![flat_json(1, 49.44, 32.06)]));
    let mut engine = engine();
    engine.load_saved();
    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);
    assert_eq!(engine.saved().empty_message(), Some("[ no saves ]"));

    engine.save_from_search(ListingId(1));

    assert_eq!(engine.saved().ids(), vec![ListingId(1)]);
    assert_eq!(engine.saved().empty_message(), None);
    let placed = engine.overlay().surface().markers_in(LayerId::Saved);
    assert_eq!(placed.len(), 1);
    assert_eq!((placed[0].at.lat, placed[0].at.lon), (49.44, 32.06));

    engine.remove(ListingId(1));

    assert!(engine.saved().is_empty());
    assert!(engine.overlay().surface().markers_in(LayerId::Saved).is_empty());
    assert_eq!(engine.saved().empty_message(), Some("[ no saves ]"));
}

#[test]
fn saved_fetch_is_not_issued_twice() {
    let mut engine = engine();

    engine.load_saved();
    engine.load_saved();

    assert_eq!(take_commands(&mut engine), vec![Command::FetchSaved]);
}

#[test]
fn failed_saved_fetch_on_empty_collection_shows_placeholder() {
    let backend = FakeBackend::new().failing_saved();
    let mut engine = engine();

    engine.load_saved();
    settle(&mut engine, &backend);

    assert_eq!(engine.saved().empty_message(), Some("[ no saves ]"));
    assert!(engine.drain_notices().is_empty());
    assert!(!engine.saved().fetch_in_flight());
}

#[test]
fn saving_from_search_is_optimistic_and_confirmed_later() {
    let backend = FakeBackend::new().with_page(0, page_range(1, 5));
    let mut engine = engine();
    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    assert!(engine.save_from_search(ListingId(3)));

    // local state changes before the server answers
    assert!(engine.saved().contains(ListingId(3)));
    assert!(engine.search().contains(ListingId(3)));
    assert!(engine
        .overlay()
        .marker_for(CollectionKind::Saved, ListingId(3))
        .is_some());
    assert!(engine.drain_notices().is_empty());

    settle(&mut engine, &backend);
    assert_eq!(engine.drain_notices(), vec![Notice::Saved(ListingId(3))]);
    assert!(backend.calls().contains(&Call::MarkSaved(ListingId(3))));
    assert_eq!(engine.gateway().pending(), 0);
}

#[test]
fn saving_twice_reports_already_saved_and_sends_one_request() {
    let backend = FakeBackend::new().with_page(0, page_range(1, 5));
    let mut engine = engine();
    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    engine.save_from_search(ListingId(2));
    engine.save_from_search(ListingId(2));

    assert_eq!(engine.saved().len(), 1);
    assert_eq!(engine.drain_notices(), vec![Notice::AlreadySaved(ListingId(2))]);
    assert_eq!(
        take_commands(&mut engine),
        vec![Command::Mutate(Mutation {
            kind: MutationKind::MarkSaved,
            id: ListingId(2),
        })]
    );
}

#[test]
fn saving_unknown_search_id_does_nothing() {
    let mut engine = engine();
    assert!(!engine.save_from_search(ListingId(77)));
    assert!(engine.saved().is_empty());
    assert!(take_commands(&mut engine).is_empty());
}

#[test]
fn failed_mutation_is_never_rolled_back() {
    let backend = FakeBackend::new()
        .with_page(0, page_range(1, 2))
        .failing_mutations();
    let mut engine = engine();
    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    engine.save_from_search(ListingId(1));
    settle(&mut engine, &backend);

    assert!(engine.saved().contains(ListingId(1)));
    assert!(engine.drain_notices().is_empty());
    assert_eq!(
        engine.gateway().unconfirmed(),
        &[Mutation {
            kind: MutationKind::MarkSaved,
            id: ListingId(1),
        }]
    );
}

#[test]
fn removing_last_save_restores_placeholder_and_drops_marker() {
    let backend = FakeBackend::new().with_saved(page_of(vec![flat_json(8, 49.0, 32.0)]));
    let mut engine = engine();
    engine.load_saved();
    settle(&mut engine, &backend);

    assert!(engine.remove(ListingId(8)));

    assert!(engine.saved().is_empty());
    assert_eq!(engine.saved().empty_message(), Some("[ no saves ]"));
    assert_eq!(engine.overlay().marker_count(CollectionKind::Saved), 0);
    assert!(engine.overlay().surface().markers_in(LayerId::Saved).is_empty());

    settle(&mut engine, &backend);
    assert_eq!(
        backend.calls(),
        vec![Call::FetchSaved, Call::UnmarkSaved(ListingId(8))]
    );
    assert!(!engine.remove(ListingId(8)));
}

#[test]
fn re_saving_after_removal_is_allowed() {
    let backend = FakeBackend::new().with_page(0, page_range(1, 1));
    let mut engine = engine();
    engine.start_new_search(FilterSet::new()).unwrap();
    settle(&mut engine, &backend);

    engine.save_from_search(ListingId(1));
    engine.remove(ListingId(1));
    engine.save_from_search(ListingId(1));
    settle(&mut engine, &backend);

    assert_eq!(engine.saved().ids(), vec![ListingId(1)]);
    assert_eq!(
        engine.drain_notices(),
        vec![Notice::Saved(ListingId(1)), Notice::Saved(ListingId(1))]
    );
}
