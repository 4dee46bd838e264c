//! Storage infrastructure: configuration and durable key/value persistence.
//!
//! - **`config`** – Reads and writes `config.toml`, with defaults for every
//!   field so a missing or partial file still yields a usable configuration.
//! - **`kv_store`** – A file-backed [`voicemap_core::KeyValueStore`] holding
//!   the navigation history between runs.
//!
//! Both live under per-user platform directories:
//!
//! | Platform | Config                                  | Data                                    |
//! |----------|-----------------------------------------|-----------------------------------------|
//! | Windows  | `%APPDATA%\Voicemap`                    | `%APPDATA%\Voicemap`                    |
//! | Linux    | `$XDG_CONFIG_HOME/voicemap`             | `$XDG_DATA_HOME/voicemap`               |
//! | macOS    | `~/Library/Application Support/Voicemap`| `~/Library/Application Support/Voicemap`|

use std::path::PathBuf;

pub mod config;
pub mod kv_store;

/// File name of the history store inside the data directory.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Per-user configuration directory, if the platform has one.
pub fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Voicemap"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("voicemap"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Voicemap")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// Per-user data directory, if the platform has one.
pub fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })?;
        Some(base.join("voicemap"))
    }

    #[cfg(not(target_os = "linux"))]
    {
        platform_config_dir()
    }
}

/// Default location of the history store.
pub fn default_history_path() -> Option<PathBuf> {
    platform_data_dir().map(|dir| dir.join(HISTORY_FILE_NAME))
}
