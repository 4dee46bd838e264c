//! Traits for the collaborators the domain drives but does not own.
//!
//! The client crate supplies the production implementations (a headless
//! viewport, a JSON file store, the system clock).  Tests supply recording
//! doubles or the [`MemoryStore`] below.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::domain::geo::LatLng;
use crate::domain::layer::LayerSelection;

/// Opaque reference to a marker placed through [`MapView::add_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// The map rendering engine, seen from the command side.
///
/// Only viewport and layer primitives are exposed; tile loading, drawing and
/// animation belong to the renderer.
pub trait MapView {
    /// Centres the viewport on `center` at `zoom`.
    fn set_view(&mut self, center: LatLng, zoom: u8);
    /// Pans the viewport by a screen-pixel offset.
    fn pan_by(&mut self, dx: i32, dy: i32);
    fn zoom_in(&mut self);
    fn zoom_out(&mut self);
    /// Current viewport centre.
    fn center(&self) -> LatLng;
    /// Current zoom level.
    fn zoom(&self) -> u8;
    fn add_layer(&mut self, layer: LayerSelection);
    /// Detaches `layer`.  Detaching a layer that is not attached is a no-op.
    fn remove_layer(&mut self, layer: LayerSelection);
    fn add_marker(&mut self, at: LatLng) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);
}

/// Failure reported by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// The backing medium holds data that is not a key/value document.
    #[error("storage is corrupt: {0}")]
    Corrupt(String),
}

/// Durable string storage keyed by name, in the manner of browser
/// `localStorage`.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Wall-clock source for history ids.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Resolves a spoken place name to coordinates.
pub trait Geocoder {
    fn geocode(&self, place: &str) -> Option<LatLng>;
}

/// [`Clock`] backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Volatile [`KeyValueStore`] kept in a `HashMap`.
///
/// Used for `--ephemeral` sessions and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw value, bypassing any encoding.
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns the raw value under `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
