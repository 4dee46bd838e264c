//! Lenient decoding of inbound frames and encoding of outbound requests.
//!
//! Decoding never fails: every frame is classified as a command, a
//! recognition error, or a dropped message carrying the reason.

use serde_json::{Map, Value};
use thiserror::Error;

use super::messages::{Inbound, Outbound};
use crate::domain::command::{Command, CommandKind};

/// Why an inbound frame was dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(String),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string \"type\" field")]
    MissingType,

    #[error("unknown command type {0:?}")]
    UnknownType(String),

    #[error("invalid {kind} command: {detail}")]
    InvalidFields { kind: CommandKind, detail: String },

    #[error("coordinates out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Classifies one inbound text frame.
///
/// An object with a non-empty string `error` field is a recognition error
/// regardless of any other fields.  Otherwise the `type` tag selects the
/// command variant and its fields must deserialise and, where present,
/// carry valid WGS-84 coordinates.
pub fn decode_inbound(text: &str) -> Inbound {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return Inbound::Dropped(DecodeError::Json(e.to_string())),
    };
    let Value::Object(object) = value else {
        return Inbound::Dropped(DecodeError::NotAnObject);
    };

    if let Some(message) = recognition_error(&object) {
        return Inbound::RecognitionError(message);
    }

    match decode_command(object) {
        Ok(command) => Inbound::Command(command),
        Err(e) => Inbound::Dropped(e),
    }
}

/// Serialises an outbound request as a JSON text frame.
pub fn encode_outbound(message: &Outbound) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

fn recognition_error(object: &Map<String, Value>) -> Option<String> {
    match object.get("error") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn decode_command(object: Map<String, Value>) -> Result<Command, DecodeError> {
    let kind = match object.get("type") {
        Some(Value::String(tag)) => {
            CommandKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownType(tag.clone()))?
        }
        _ => return Err(DecodeError::MissingType),
    };

    let command: Command =
        serde_json::from_value(Value::Object(object)).map_err(|e| DecodeError::InvalidFields {
            kind,
            detail: e.to_string(),
        })?;

    if let Some(position) = command.position() {
        if !position.is_valid() {
            return Err(DecodeError::OutOfRange {
                latitude: position.lat,
                longitude: position.lng,
            });
        }
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::{Direction, ZoomAction};

    #[test]
    fn test_decodes_command_frame() {
        let inbound = decode_inbound(r#"{"type":"move","direction":"up"}"#);
        assert_eq!(
            inbound,
            Inbound::Command(Command::Move {
                direction: Direction::Up
            })
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let inbound = decode_inbound(r#"{"type":"zoom","action":"in","confidence":0.9}"#);
        assert_eq!(
            inbound,
            Inbound::Command(Command::Zoom {
                action: ZoomAction::In
            })
        );
    }

    #[test]
    fn test_error_field_becomes_recognition_error() {
        let inbound = decode_inbound(r#"{"error":"Location \"atlantis\" not found"}"#);
        assert_eq!(
            inbound,
            Inbound::RecognitionError(r#"Location "atlantis" not found"#.to_string())
        );
    }

    #[test]
    fn test_empty_error_field_is_not_a_recognition_error() {
        let inbound = decode_inbound(r#"{"error":""}"#);
        assert_eq!(inbound, Inbound::Dropped(DecodeError::MissingType));
    }

    #[test]
    fn test_unknown_tag_is_dropped() {
        let inbound = decode_inbound(r#"{"type":"teleport","to":"mars"}"#);
        assert_eq!(
            inbound,
            Inbound::Dropped(DecodeError::UnknownType("teleport".to_string()))
        );
    }

    #[test]
    fn test_missing_field_is_dropped_with_kind() {
        let inbound = decode_inbound(r#"{"type":"center","latitude":1.0}"#);
        match inbound {
            Inbound::Dropped(DecodeError::InvalidFields { kind, .. }) => {
                assert_eq!(kind, CommandKind::Center)
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_coordinates_are_dropped() {
        let inbound = decode_inbound(r#"{"type":"marker","latitude":123.0,"longitude":0.0}"#);
        assert_eq!(
            inbound,
            Inbound::Dropped(DecodeError::OutOfRange {
                latitude: 123.0,
                longitude: 0.0
            })
        );
    }

    #[test]
    fn test_non_object_and_garbage_are_dropped() {
        assert_eq!(decode_inbound("[1,2]"), Inbound::Dropped(DecodeError::NotAnObject));
        assert!(matches!(
            decode_inbound("not json"),
            Inbound::Dropped(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_encode_outbound() {
        assert_eq!(
            encode_outbound(&Outbound::StartRecognition).unwrap(),
            r#"{"type":"start_recognition"}"#
        );
    }
}
