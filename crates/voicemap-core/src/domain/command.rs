//! The structured command produced by the recognition service.
//!
//! A command is a JSON object whose `"type"` field selects the variant; the
//! remaining fields are flattened into the same object:
//!
//! ```json
//! {"type":"navigate","city":"paris","latitude":48.8566,"longitude":2.3522}
//! {"type":"zoom","action":"in"}
//! {"type":"move","direction":"left"}
//! {"type":"show","layer":"satellite"}
//! ```
//!
//! Commands are consumed exactly once by the dispatcher and then dropped.

use serde::{Deserialize, Serialize};

use super::geo::LatLng;

/// One map or UI mutation derived from a recognised phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Jump to a named place, replacing all markers with one at the place.
    Navigate {
        city: String,
        latitude: f64,
        longitude: f64,
    },
    /// Change the zoom by one level.
    Zoom { action: ZoomAction },
    /// Pan the viewport by a fixed pixel step.
    Move { direction: Direction },
    /// Attach a base layer.  `layer` is free text as spoken.
    Show { layer: String },
    /// Detach a base layer, falling back to its paired default.
    Hide { layer: String },
    /// Re-centre on a place, keeping the current zoom.
    Center { latitude: f64, longitude: f64 },
    /// Drop an extra marker without clearing existing ones.
    Marker { latitude: f64, longitude: f64 },
}

impl Command {
    /// Returns the fieldless discriminant, used for logging.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Navigate { .. } => CommandKind::Navigate,
            Command::Zoom { .. } => CommandKind::Zoom,
            Command::Move { .. } => CommandKind::Move,
            Command::Show { .. } => CommandKind::Show,
            Command::Hide { .. } => CommandKind::Hide,
            Command::Center { .. } => CommandKind::Center,
            Command::Marker { .. } => CommandKind::Marker,
        }
    }

    /// Returns the target position for commands that carry coordinates.
    pub fn position(&self) -> Option<LatLng> {
        match self {
            Command::Navigate {
                latitude,
                longitude,
                ..
            }
            | Command::Center {
                latitude,
                longitude,
            }
            | Command::Marker {
                latitude,
                longitude,
            } => Some(LatLng::new(*latitude, *longitude)),
            _ => None,
        }
    }
}

/// Fieldless mirror of [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Navigate,
    Zoom,
    Move,
    Show,
    Hide,
    Center,
    Marker,
}

impl CommandKind {
    /// Every tag accepted on the wire, in the recogniser's matching order.
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Navigate,
        CommandKind::Zoom,
        CommandKind::Move,
        CommandKind::Show,
        CommandKind::Hide,
        CommandKind::Center,
        CommandKind::Marker,
    ];

    /// The wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Navigate => "navigate",
            CommandKind::Zoom => "zoom",
            CommandKind::Move => "move",
            CommandKind::Show => "show",
            CommandKind::Hide => "hide",
            CommandKind::Center => "center",
            CommandKind::Marker => "marker",
        }
    }

    /// Looks up a kind by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a one-level zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomAction {
    In,
    Out,
}

/// Direction of a fixed-step pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Screen-pixel offset for a pan of `step` pixels in this direction.
    ///
    /// Screen `y` grows downwards, so `Up` is a negative `dy`.
    pub fn pan_offset(self, step: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -step),
            Direction::Down => (0, step),
            Direction::Left => (-step, 0),
            Direction::Right => (step, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_deserializes_from_wire_json() {
        // Arrange
        let json = r#"{"type":"navigate","city":"paris","latitude":48.8566,"longitude":2.3522}"#;

        // Act
        let cmd: Command = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(
            cmd,
            Command::Navigate {
                city: "paris".to_string(),
                latitude: 48.8566,
                longitude: 2.3522,
            }
        );
    }

    #[test]
    fn test_zoom_serializes_with_lowercase_tag_and_action() {
        let json = serde_json::to_string(&Command::Zoom {
            action: ZoomAction::Out,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"zoom","action":"out"}"#);
    }

    #[test]
    fn test_unknown_direction_fails_to_deserialize() {
        let result: Result<Command, _> =
            serde_json::from_str(r#"{"type":"move","direction":"sideways"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_coordinates_fail_to_deserialize() {
        let result: Result<Command, _> = serde_json::from_str(r#"{"type":"marker","latitude":1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_matches_variant() {
        let cmd = Command::Hide {
            layer: "terrain".to_string(),
        };
        assert_eq!(cmd.kind(), CommandKind::Hide);
        assert_eq!(cmd.kind().as_str(), "hide");
    }

    #[test]
    fn test_from_tag_knows_every_kind() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(CommandKind::from_tag("teleport"), None);
    }

    #[test]
    fn test_position_only_for_coordinate_commands() {
        let center = Command::Center {
            latitude: 1.0,
            longitude: 2.0,
        };
        assert_eq!(center.position(), Some(LatLng::new(1.0, 2.0)));
        assert_eq!(
            Command::Zoom {
                action: ZoomAction::In
            }
            .position(),
            None
        );
    }

    #[test]
    fn test_pan_offsets_use_screen_axes() {
        assert_eq!(Direction::Up.pan_offset(100), (0, -100));
        assert_eq!(Direction::Down.pan_offset(100), (0, 100));
        assert_eq!(Direction::Left.pan_offset(100), (-100, 0));
        assert_eq!(Direction::Right.pan_offset(100), (100, 0));
    }
}
