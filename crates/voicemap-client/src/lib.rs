//! voicemap-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client connects to a speech-recognition service, receives structured
//! map commands, and applies them to a map view while keeping the layer
//! picker, navigation history and connectivity badge consistent.

/// Application layer: command dispatch, controls, and the event loop.
pub mod application;

/// Infrastructure layer: network, storage, console and map adapters.
pub mod infrastructure;
