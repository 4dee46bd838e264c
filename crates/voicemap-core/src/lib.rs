//! # voicemap-core
//!
//! Shared library for voicemap containing the command model, the map UI
//! state machines, the wire protocol spoken with the recognition service, and
//! the spoken-phrase grammar.
//!
//! This crate has zero dependencies on sockets, async runtimes, files, or a
//! rendering engine.  Everything that touches the outside world is expressed
//! as a trait in [`ports`] and implemented by the client crate.
//!
//! # Architecture overview
//!
//! voicemap turns recognised speech into map mutations.  A recognition
//! service hears "navigate to paris", resolves the place, and sends a
//! structured command.  The client applies it to the map and keeps the
//! surrounding UI (history panel, layer picker, connectivity badge) in step.
//!
//! - **`domain`** – The state owned by the client: placed markers, the
//!   mutually exclusive base layer, the bounded navigation history, and the
//!   connectivity indicator.  All of it is plain data plus transition rules.
//!
//! - **`protocol`** – The JSON messages exchanged with the recognition service
//!   and the lenient decoder that turns a text frame into a command, a
//!   recognition error, or a dropped message.
//!
//! - **`grammar`** – The phrase patterns the recognition side matches, usable
//!   locally when commands are typed rather than spoken.
//!
//! - **`ports`** – Traits for the map renderer, durable key/value storage,
//!   place-name geocoding and the wall clock.

pub mod domain;
pub mod grammar;
pub mod ports;
pub mod protocol;

pub use domain::command::{Command, CommandKind, Direction, ZoomAction};
pub use domain::connectivity::{
    ConnectivityIndicator, ConnectivityState, IndicatorTimings, IndicatorUpdate, IndicatorView,
    TimerTicket,
};
pub use domain::geo::LatLng;
pub use domain::history::{HistoryEntry, HistoryError, HistoryStore, HISTORY_CAPACITY, HISTORY_KEY};
pub use domain::layer::{LayerSelection, LayerStateMachine, LayerTransition};
pub use domain::marker::MarkerManager;
pub use grammar::{Grammar, GrammarError, Intent, ResolveError};
pub use ports::{
    Clock, Geocoder, KeyValueStore, MapView, MarkerHandle, MemoryStore, StorageError, SystemClock,
};
pub use protocol::{decode_inbound, encode_outbound, DecodeError, Inbound, Outbound};
