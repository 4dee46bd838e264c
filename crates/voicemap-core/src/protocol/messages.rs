//! Message types exchanged with the recognition service.
//!
//! # Inbound payloads
//!
//! ```json
//! {"type":"zoom","action":"in"}
//! {"error":"Location \"atlantis\" not found"}
//! ```
//!
//! Inbound frames are not deserialised straight into an enum: a payload that
//! fails to decode still has to be classified so it can be logged and
//! dropped.  See [`super::codec::decode_inbound`].
//!
//! # Outbound payloads
//!
//! ```json
//! {"type":"start_recognition"}
//! ```

use serde::{Deserialize, Serialize};

use super::codec::DecodeError;
use crate::domain::command::Command;

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A well-formed command ready for dispatch.
    Command(Command),
    /// The service heard something but could not turn it into a command.
    RecognitionError(String),
    /// The frame could not be understood.  Logged, never surfaced.
    Dropped(DecodeError),
}

/// Requests the client sends to the recognition service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Capture and recognise the next utterance.
    StartRecognition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_recognition_wire_form() {
        let json = serde_json::to_string(&Outbound::StartRecognition).unwrap();
        assert_eq!(json, r#"{"type":"start_recognition"}"#);
    }

    #[test]
    fn test_start_recognition_decodes_from_wire_form() {
        let message: Outbound = serde_json::from_str(r#"{"type":"start_recognition"}"#).unwrap();
        assert_eq!(message, Outbound::StartRecognition);
    }
}
