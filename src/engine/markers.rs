use crate::domain::{Coordinates, Listing, ListingId};
use crate::engine::collection::{CollectionKind, CollectionObserver};
use crate::templates::popup_summary;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Zoom used when a card asks to be shown on the map.
pub const FOCUS_ZOOM: u8 = 20;

/// Named map layers. Visibility is keyed by these, never by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Saved,
    Search,
    SearchCircle,
}

/// Opaque handle the map surface hands out for a placed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// The map widget. Only ever driven through `MarkerOverlay`.
pub trait MapSurface {
    fn add_marker(&mut self, layer: LayerId, at: Coordinates, popup: &str) -> MarkerHandle;
    fn remove_marker(&mut self, layer: LayerId, handle: MarkerHandle);
    fn focus(&mut self, at: Coordinates, zoom: u8);
    fn set_layer_visible(&mut self, layer: LayerId, visible: bool);
    fn set_circle(&mut self, center: Coordinates, radius_m: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerRef {
    pub handle: MarkerHandle,
    pub at: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchCircle {
    pub center: Coordinates,
    pub radius_m: f64,
}

/// Keeps exactly one marker per listing per collection layer, plus the
/// reverse mapping used to navigate from a marker back to its card.
/// Listing identity is only referenced here; membership lives in the
/// collections.
pub struct MarkerOverlay<M: MapSurface> {
    surface: M,
    layers: HashMap<CollectionKind, HashMap<ListingId, MarkerRef>>,
    owners: HashMap<MarkerHandle, (CollectionKind, ListingId)>,
    visibility: BTreeMap<LayerId, bool>,
    circle: SearchCircle,
}

impl<M: MapSurface> MarkerOverlay<M> {
    pub fn new(mut surface: M) -> Self {
        let visibility = BTreeMap::from([
            (LayerId::Saved, false),
            (LayerId::Search, true),
            (LayerId::SearchCircle, false),
        ]);
        for (layer, visible) in &visibility {
            surface.set_layer_visible(*layer, *visible);
        }

        let circle = SearchCircle {
            center: Coordinates::new(0.0, 0.0),
            radius_m: 0.0,
        };
        surface.set_circle(circle.center, circle.radius_m);

        Self {
            surface,
            layers: HashMap::new(),
            owners: HashMap::new(),
            visibility,
            circle,
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn create_marker(&mut self, listing: &Listing, kind: CollectionKind) -> MarkerHandle {
        // keep the mapping 1:1 if the same id is ever re-added
        self.remove_marker(listing.id, kind);

        let popup = popup_summary(listing).into_string();
        let handle = self
            .surface
            .add_marker(kind.layer(), listing.coordinates, &popup);

        self.layers.entry(kind).or_default().insert(
            listing.id,
            MarkerRef {
                handle,
                at: listing.coordinates,
            },
        );
        self.owners.insert(handle, (kind, listing.id));
        handle
    }

    pub fn remove_marker(&mut self, id: ListingId, kind: CollectionKind) -> bool {
        let Some(marker) = self.layers.get_mut(&kind).and_then(|layer| layer.remove(&id)) else {
            return false;
        };
        self.surface.remove_marker(kind.layer(), marker.handle);
        self.owners.remove(&marker.handle);
        true
    }

    pub fn remove_all_in_layer(&mut self, kind: CollectionKind) {
        let Some(layer) = self.layers.remove(&kind) else {
            return;
        };
        debug!(?kind, count = layer.len(), "tearing down layer markers");
        for marker in layer.into_values() {
            self.surface.remove_marker(kind.layer(), marker.handle);
            self.owners.remove(&marker.handle);
        }
    }

    pub fn marker_for(&self, kind: CollectionKind, id: ListingId) -> Option<MarkerRef> {
        self.layers.get(&kind)?.get(&id).copied()
    }

    /// Marker -> listing, for focusing the card a marker stands for.
    pub fn listing_for(&self, handle: MarkerHandle) -> Option<(CollectionKind, ListingId)> {
        self.owners.get(&handle).copied()
    }

    pub fn marker_ids(&self, kind: CollectionKind) -> HashSet<ListingId> {
        self.layers
            .get(&kind)
            .map(|layer| layer.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn marker_count(&self, kind: CollectionKind) -> usize {
        self.layers.get(&kind).map_or(0, HashMap::len)
    }

    pub fn is_layer_visible(&self, layer: LayerId) -> bool {
        self.visibility.get(&layer).copied().unwrap_or(false)
    }

    pub fn set_layer_visible(&mut self, layer: LayerId, visible: bool) {
        self.visibility.insert(layer, visible);
        self.surface.set_layer_visible(layer, visible);
    }

    /// Centres the map on a listing's marker, shows that listing's layer and
    /// hides the other collection's layer.
    pub fn show_listing(&mut self, kind: CollectionKind, id: ListingId) -> Option<MarkerHandle> {
        let marker = self.marker_for(kind, id)?;
        self.surface.focus(marker.at, FOCUS_ZOOM);
        self.set_layer_visible(kind.layer(), true);
        self.set_layer_visible(kind.other().layer(), false);
        Some(marker.handle)
    }

    pub fn circle(&self) -> SearchCircle {
        self.circle
    }

    /// Moves the search circle. Ignored while its layer is hidden.
    pub fn place_circle(&mut self, center: Coordinates) -> bool {
        if !self.is_layer_visible(LayerId::SearchCircle) {
            return false;
        }
        self.circle.center = center;
        self.surface.set_circle(self.circle.center, self.circle.radius_m);
        true
    }

    /// Sets the radius to the distance between the centre and `edge`.
    pub fn stretch_circle(&mut self, edge: Coordinates) -> bool {
        if !self.is_layer_visible(LayerId::SearchCircle) {
            return false;
        }
        self.circle.radius_m = self.circle.center.distance_km(&edge) * 1000.0;
        self.surface.set_circle(self.circle.center, self.circle.radius_m);
        true
    }
}

impl<M: MapSurface> CollectionObserver for MarkerOverlay<M> {
    fn entry_added(&mut self, kind: CollectionKind, listing: &Listing) {
        self.create_marker(listing, kind);
    }

    fn entry_removed(&mut self, kind: CollectionKind, id: ListingId) {
        self.remove_marker(id, kind);
    }

    fn cleared(&mut self, kind: CollectionKind) {
        self.remove_all_in_layer(kind);
    }
}
