//! A headless map viewport.
//!
//! Tracks what a tile renderer would display (centre, zoom, attached base
//! layers, and markers) without drawing anything.  Pixel pans are converted
//! to coordinate shifts with the Web-Mercator projection.

use std::collections::BTreeMap;

use tracing::trace;
use voicemap_core::{LatLng, LayerSelection, MapView, MarkerHandle};

#[derive(Debug)]
pub struct HeadlessMap {
    center: LatLng,
    zoom: u8,
    min_zoom: u8,
    max_zoom: u8,
    layers: Vec<LayerSelection>,
    markers: BTreeMap<u64, LatLng>,
    next_marker: u64,
}

impl HeadlessMap {
    /// Creates a viewport at `center`, with `zoom` clamped to
    /// `min_zoom..=max_zoom`.  No layers or markers are attached.
    pub fn new(center: LatLng, zoom: u8, min_zoom: u8, max_zoom: u8) -> Self {
        let max_zoom = max_zoom.max(min_zoom);
        Self {
            center,
            zoom: zoom.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            layers: Vec::new(),
            markers: BTreeMap::new(),
            next_marker: 0,
        }
    }

    /// Attached base layers in attachment order.
    pub fn attached_layers(&self) -> &[LayerSelection] {
        &self.layers
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Marker positions in placement order.
    pub fn marker_positions(&self) -> Vec<LatLng> {
        self.markers.values().copied().collect()
    }
}

impl MapView for HeadlessMap {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        trace!("view set to {:.4}, {:.4} @ {}", center.lat, center.lng, self.zoom);
    }

    fn pan_by(&mut self, dx: i32, dy: i32) {
        self.center = self.center.offset_by_pixels(dx, dy, self.zoom);
    }

    fn zoom_in(&mut self) {
        self.zoom = self.zoom.saturating_add(1).min(self.max_zoom);
    }

    fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(self.min_zoom);
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn add_layer(&mut self, layer: LayerSelection) {
        if !self.layers.contains(&layer) {
            self.layers.push(layer);
        }
    }

    fn remove_layer(&mut self, layer: LayerSelection) {
        self.layers.retain(|l| *l != layer);
    }

    fn add_marker(&mut self, at: LatLng) -> MarkerHandle {
        self.next_marker += 1;
        self.markers.insert(self.next_marker, at);
        MarkerHandle(self.next_marker)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn india() -> HeadlessMap {
        HeadlessMap::new(LatLng::new(22.5937, 78.9629), 6, 0, 18)
    }

    #[test]
    fn test_zoom_is_clamped_to_bounds() {
        // Arrange
        let mut map = HeadlessMap::new(LatLng::new(0.0, 0.0), 17, 0, 18);

        // Act
        map.zoom_in();
        map.zoom_in();

        // Assert
        assert_eq!(map.zoom(), 18);

        map.set_view(LatLng::new(0.0, 0.0), 0);
        map.zoom_out();
        assert_eq!(map.zoom(), 0);

        map.set_view(LatLng::new(0.0, 0.0), 40);
        assert_eq!(map.zoom(), 18);
    }

    #[test]
    fn test_zoom_in_at_widest_configurable_bound_stays_put() {
        let mut map = HeadlessMap::new(LatLng::new(0.0, 0.0), 255, 0, 255);

        map.zoom_in();

        assert_eq!(map.zoom(), 255);
    }

    #[test]
    fn test_pan_up_moves_centre_north() {
        let mut map = india();
        map.pan_by(0, -100);
        assert!(map.center().lat > 22.5937);
        assert!((map.center().lng - 78.9629).abs() < 1e-9);
    }

    #[test]
    fn test_pan_right_moves_centre_east() {
        let mut map = india();
        map.pan_by(100, 0);
        assert!(map.center().lng > 78.9629);
    }

    #[test]
    fn test_adding_a_layer_twice_attaches_it_once() {
        let mut map = india();
        map.add_layer(LayerSelection::Road);
        map.add_layer(LayerSelection::Road);
        map.remove_layer(LayerSelection::Satellite);
        assert_eq!(map.attached_layers(), &[LayerSelection::Road]);
    }

    #[test]
    fn test_removed_marker_is_forgotten() {
        let mut map = india();
        let a = map.add_marker(LatLng::new(1.0, 1.0));
        map.add_marker(LatLng::new(2.0, 2.0));

        map.remove_marker(a);

        assert_eq!(map.marker_positions(), vec![LatLng::new(2.0, 2.0)]);
    }
}
