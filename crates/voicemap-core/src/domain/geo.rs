//! Geographic coordinates and the Web-Mercator pixel projection.
//!
//! Pans are expressed in screen pixels while the viewport centre is a
//! latitude/longitude pair, so moving the view by "100 pixels up" needs the
//! spherical Mercator projection used by slippy-map tiles.

use serde::{Deserialize, Serialize};

/// Edge length of one map tile in pixels at every zoom level.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude bound of the square Web-Mercator world.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite and inside the WGS-84
    /// ranges (`-90..=90`, `-180..=180`).
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Returns the position reached by shifting this point by `(dx, dy)`
    /// screen pixels at `zoom`.
    ///
    /// Positive `dx` moves east, positive `dy` moves south, matching screen
    /// coordinates.  Latitude is clamped to the Mercator world and longitude
    /// wraps into `-180..180`.
    pub fn offset_by_pixels(&self, dx: i32, dy: i32, zoom: u8) -> LatLng {
        let world = world_size(zoom);
        let (x, y) = self.project(world);
        LatLng::unproject(x + f64::from(dx), y + f64::from(dy), world)
    }

    fn project(&self, world: f64) -> (f64, f64) {
        let lat = self
            .lat
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let x = (self.lng + 180.0) / 360.0 * world;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * world;
        (x, y)
    }

    fn unproject(x: f64, y: f64, world: f64) -> LatLng {
        let n = std::f64::consts::PI * (1.0 - 2.0 * y / world);
        let lat = n.sinh().atan().to_degrees();
        let lng = (x / world * 360.0 - 180.0 + 180.0).rem_euclid(360.0) - 180.0;
        LatLng {
            lat: lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE),
            lng,
        }
    }
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}
