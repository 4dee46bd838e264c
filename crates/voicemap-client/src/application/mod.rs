//! Application layer use cases for the voicemap client.
//!
//! - **`dispatch_command`** – Applies one recognised [`voicemap_core::Command`]
//!   to the map, the marker set, the base-layer state machine and the
//!   navigation history.
//!
//! - **`control_surface`** – The microphone toggle and the seam to whatever
//!   renders the status line, layer picker, history panel and connectivity
//!   badge.  The renderer and the recognition peer are injected as traits.
//!
//! - **`event_loop`** – The single queue every producer posts into, and the
//!   task that drains it, owning the components above.

pub mod control_surface;
pub mod dispatch_command;
pub mod event_loop;
