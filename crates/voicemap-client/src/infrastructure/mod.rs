//! Infrastructure layer for the voicemap client.
//!
//! Adapters between the application layer and the outside world.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `voicemap_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`transport`** – WebSocket client for the recognition service.  Decodes
//!   inbound frames, turns link up/down into connectivity signals, and
//!   reconnects after a fixed delay.
//! - **`storage`** – `config.toml` persistence and the file-backed key/value
//!   store that holds the navigation history.
//! - **`map`** – A headless viewport implementing `MapView`.
//! - **`ui`** – Console rendering of the status line, picker, history and
//!   connectivity badge.
//! - **`console`** – Reads control commands and typed utterances from stdin.
//! - **`gazetteer`** – Offline place-name lookup for typed utterances.

pub mod console;
pub mod gazetteer;
pub mod map;
pub mod storage;
pub mod transport;
pub mod ui;
