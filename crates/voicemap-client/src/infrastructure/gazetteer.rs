//! Offline place-name lookup.
//!
//! Typed utterances are resolved locally rather than by the recognition
//! service, so the client carries a small table of known places.  Lookups are
//! case-insensitive and ignore surrounding whitespace.

use std::collections::HashMap;

use tracing::warn;
use voicemap_core::{Geocoder, LatLng};

use super::storage::config::PlaceEntry;

#[derive(Debug, Default, Clone)]
pub struct Gazetteer {
    places: HashMap<String, LatLng>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a gazetteer from config entries.  Entries with coordinates
    /// outside the WGS-84 ranges are skipped; later duplicates win.
    pub fn from_entries(entries: &[PlaceEntry]) -> Self {
        let mut gazetteer = Self::new();
        for entry in entries {
            let at = LatLng::new(entry.latitude, entry.longitude);
            if at.is_valid() {
                gazetteer.insert(&entry.name, at);
            } else {
                warn!("place {:?} has invalid coordinates, skipped", entry.name);
            }
        }
        gazetteer
    }

    pub fn insert(&mut self, name: &str, at: LatLng) {
        self.places.insert(normalise(name), at);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl Geocoder for Gazetteer {
    fn geocode(&self, place: &str) -> Option<LatLng> {
        self.places.get(&normalise(place)).copied()
    }
}

fn normalise(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
