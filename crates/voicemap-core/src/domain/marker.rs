//! Point markers placed by `navigate` and `marker` commands.

use tracing::debug;

use super::geo::LatLng;
use crate::ports::{MapView, MarkerHandle};

#[derive(Debug, Clone, Copy)]
struct PlacedMarker {
    handle: MarkerHandle,
    position: LatLng,
}

/// Owns every marker currently attached to the map.
///
/// Markers are fungible: there is no cap and no identity beyond list order.
#[derive(Debug, Default)]
pub struct MarkerManager {
    markers: Vec<PlacedMarker>,
}

impl MarkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a marker at `at`, attaches it to `map`, and retains it.
    pub fn add_marker(&mut self, map: &mut dyn MapView, at: LatLng) {
        let handle = map.add_marker(at);
        self.markers.push(PlacedMarker {
            handle,
            position: at,
        });
        debug!(count = self.markers.len(), "marker placed at {:.4}, {:.4}", at.lat, at.lng);
    }

    /// Detaches and releases every retained marker.
    pub fn clear_markers(&mut self, map: &mut dyn MapView) {
        for marker in self.markers.drain(..) {
            map.remove_marker(marker.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Positions of the retained markers in placement order.
    pub fn positions(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.markers.iter().map(|m| m.position)
    }
}
