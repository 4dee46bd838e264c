//! Wire protocol spoken with the recognition service.
//!
//! Frames are JSON text.  The service pushes `recognized_command` payloads
//! (either a [`crate::Command`] object or an `{"error": ...}` object) and the
//! client asks it to listen with `{"type":"start_recognition"}`.

pub mod codec;
pub mod messages;

pub use codec::{decode_inbound, encode_outbound, DecodeError};
pub use messages::{Inbound, Outbound};
