use crate::domain::Coordinates;
use crate::engine::markers::{LayerId, MapSurface, MarkerHandle};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub handle: MarkerHandle,
    pub layer: LayerId,
    pub at: Coordinates,
    pub popup: String,
}

/// In-process map surface. Records what a real map widget would display.
#[derive(Debug, Default)]
pub struct MemoryMap {
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
    visible: HashMap<LayerId, bool>,
    focused: Option<(Coordinates, u8)>,
    circle: Option<(Coordinates, f64)>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers_in(&self, layer: LayerId) -> Vec<&PlacedMarker> {
        self.markers.values().filter(|m| m.layer == layer).collect()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&PlacedMarker> {
        self.markers.get(&handle)
    }

    pub fn is_visible(&self, layer: LayerId) -> bool {
        self.visible.get(&layer).copied().unwrap_or(false)
    }

    pub fn focused(&self) -> Option<(Coordinates, u8)> {
        self.focused
    }

    pub fn circle(&self) -> Option<(Coordinates, f64)> {
        self.circle
    }
}

impl MapSurface for MemoryMap {
    fn add_marker(&mut self, layer: LayerId, at: Coordinates, popup: &str) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(
            handle,
            PlacedMarker {
                handle,
                layer,
                at,
                popup: popup.to_string(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, layer: LayerId, handle: MarkerHandle) {
        if self.markers.get(&handle).is_some_and(|m| m.layer == layer) {
            self.markers.remove(&handle);
        }
    }

    fn focus(&mut self, at: Coordinates, zoom: u8) {
        self.focused = Some((at, zoom));
    }

    fn set_layer_visible(&mut self, layer: LayerId, visible: bool) {
        self.visible.insert(layer, visible);
    }

    fn set_circle(&mut self, center: Coordinates, radius_m: f64) {
        self.circle = Some((center, radius_m));
    }
}
