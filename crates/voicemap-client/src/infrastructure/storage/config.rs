//! TOML-based configuration for the voicemap client.
//!
//! Read from `config.toml` in the platform config directory (see
//! [`super::platform_config_dir`]) unless another path is given on the
//! command line.  Example:
//!
//! ```toml
//! [client]
//! log_level = "debug"
//!
//! [transport]
//! server_url = "ws://127.0.0.1:5000/recognition"
//! reconnect_delay_ms = 2000
//!
//! [map]
//! initial_zoom = 6
//!
//! [[places]]
//! name = "paris"
//! latitude = 48.8566
//! longitude = 2.3522
//! ```
//!
//! Every field has a serde default, so an absent file or a file naming only
//! a few fields still produces a complete [`AppConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use voicemap_core::{IndicatorTimings, LatLng};

use crate::application::dispatch_command::DispatchSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    /// Gazetteer used to resolve typed utterances.
    #[serde(default = "default_places")]
    pub places: Vec<PlaceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// History file; the platform data directory when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// WebSocket URL of the recognition service.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Pause between connection attempts.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Capacity of the client event queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_initial_latitude")]
    pub initial_latitude: f64,
    #[serde(default = "default_initial_longitude")]
    pub initial_longitude: f64,
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
    /// Zoom applied by `navigate`.
    #[serde(default = "default_navigate_zoom")]
    pub navigate_zoom: u8,
    /// Pixels per `move` step.
    #[serde(default = "default_pan_step")]
    pub pan_step: i32,
    #[serde(default)]
    pub min_zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    #[serde(default = "default_show_delay_ms")]
    pub show_delay_ms: u64,
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_server_url() -> String {
    "ws://127.0.0.1:5000/recognition".to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    2000
}
fn default_queue_capacity() -> usize {
    64
}
fn default_initial_latitude() -> f64 {
    22.5937
}
fn default_initial_longitude() -> f64 {
    78.9629
}
fn default_initial_zoom() -> u8 {
    6
}
fn default_navigate_zoom() -> u8 {
    13
}
fn default_pan_step() -> i32 {
    100
}
fn default_max_zoom() -> u8 {
    18
}
fn default_show_delay_ms() -> u64 {
    10
}
fn default_dwell_ms() -> u64 {
    1000
}
fn default_fade_ms() -> u64 {
    500
}

fn default_places() -> Vec<PlaceEntry> {
    [
        ("delhi", 28.6139, 77.2090),
        ("new delhi", 28.6139, 77.2090),
        ("mumbai", 19.0760, 72.8777),
        ("bangalore", 12.9716, 77.5946),
        ("kolkata", 22.5726, 88.3639),
        ("chennai", 13.0827, 80.2707),
        ("london", 51.5074, -0.1278),
        ("paris", 48.8566, 2.3522),
        ("new york", 40.7128, -74.0060),
        ("tokyo", 35.6762, 139.6503),
        ("sydney", -33.8688, 151.2093),
    ]
    .into_iter()
    .map(|(name, latitude, longitude)| PlaceEntry {
        name: name.to_string(),
        latitude,
        longitude,
    })
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            transport: TransportConfig::default(),
            map: MapConfig::default(),
            indicator: IndicatorConfig::default(),
            places: default_places(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            history_file: None,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_latitude: default_initial_latitude(),
            initial_longitude: default_initial_longitude(),
            initial_zoom: default_initial_zoom(),
            navigate_zoom: default_navigate_zoom(),
            pan_step: default_pan_step(),
            min_zoom: 0,
            max_zoom: default_max_zoom(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: default_show_delay_ms(),
            dwell_ms: default_dwell_ms(),
            fade_ms: default_fade_ms(),
        }
    }
}

impl TransportConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl MapConfig {
    pub fn initial_center(&self) -> LatLng {
        LatLng::new(self.initial_latitude, self.initial_longitude)
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            navigate_zoom: self.navigate_zoom,
            pan_step: self.pan_step,
        }
    }
}

impl IndicatorConfig {
    pub fn timings(&self) -> IndicatorTimings {
        IndicatorTimings {
            show_delay: Duration::from_millis(self.show_delay_ms),
            dwell: Duration::from_millis(self.dwell_ms),
            fade: Duration::from_millis(self.fade_ms),
        }
    }
}

/// `config.toml` inside the platform config directory.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    super::platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration from `path`.
///
/// A missing file yields [`AppConfig::default`].
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
