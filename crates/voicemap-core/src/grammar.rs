//! Spoken-phrase grammar.
//!
//! Turns a transcribed utterance into an [`Intent`], and an intent plus a
//! [`Geocoder`] into a [`Command`].  Patterns are tried in a fixed order and
//! the first match wins:
//!
//! | Phrase                                   | Intent     |
//! |------------------------------------------|------------|
//! | `navigate to <place>`                    | `Navigate` |
//! | `zoom in` / `zoom out`                   | `Zoom`     |
//! | `move up\|down\|left\|right`             | `Move`     |
//! | `show [me] [the] <layer> [layer\|view]`  | `Show`     |
//! | `hide [the] <layer> [layer\|view]`       | `Hide`     |
//! | `center on\|at <place>`                  | `Center`   |
//! | `add [a] marker at\|on <place>`          | `Marker`   |

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::domain::command::{Command, Direction, ZoomAction};
use crate::ports::Geocoder;
use crate::protocol::messages::Inbound;

/// Reported when nothing was heard.
pub const NOT_UNDERSTOOD: &str = "Could not understand the command";
/// Reported when the utterance matches no pattern.
pub const NOT_RECOGNIZED: &str = "Command not recognized";

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("invalid phrase pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A place name could not be geocoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Location \"{0}\" not found")]
    LocationNotFound(String),
}

/// A recognised phrase whose place names are still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate { place: String },
    Zoom(ZoomAction),
    Move(Direction),
    Show { layer: String },
    Hide { layer: String },
    Center { place: String },
    Marker { place: String },
}

impl Intent {
    /// Geocodes any place name and builds the wire command.
    pub fn resolve(self, geocoder: &dyn Geocoder) -> Result<Command, ResolveError> {
        let locate = |place: &str| {
            geocoder
                .geocode(place)
                .ok_or_else(|| ResolveError::LocationNotFound(place.to_string()))
        };
        Ok(match self {
            Intent::Navigate { place } => {
                let at = locate(&place)?;
                Command::Navigate {
                    city: place,
                    latitude: at.lat,
                    longitude: at.lng,
                }
            }
            Intent::Zoom(action) => Command::Zoom { action },
            Intent::Move(direction) => Command::Move { direction },
            Intent::Show { layer } => Command::Show { layer },
            Intent::Hide { layer } => Command::Hide { layer },
            Intent::Center { place } => {
                let at = locate(&place)?;
                Command::Center {
                    latitude: at.lat,
                    longitude: at.lng,
                }
            }
            Intent::Marker { place } => {
                let at = locate(&place)?;
                Command::Marker {
                    latitude: at.lat,
                    longitude: at.lng,
                }
            }
        })
    }
}

/// Compiled phrase patterns.
#[derive(Debug)]
pub struct Grammar {
    navigate: Regex,
    zoom: Regex,
    movement: Regex,
    show: Regex,
    hide: Regex,
    center: Regex,
    marker: Regex,
}

impl Grammar {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self {
            navigate: Regex::new(r"^navigate to (.+)$")?,
            zoom: Regex::new(r"^zoom (in|out)\b")?,
            movement: Regex::new(r"^move (up|down|left|right)\b")?,
            show: Regex::new(r"^show (?:me )?(?:the )?(.+?)(?: layer| view)?$")?,
            hide: Regex::new(r"^hide (?:the )?(.+?)(?: layer| view)?$")?,
            center: Regex::new(r"^center (?:on|at) (.+)$")?,
            marker: Regex::new(r"^add (?:a )?marker (?:at|on) (.+)$")?,
        })
    }

    /// Matches `utterance` (case-insensitive, surrounding whitespace
    /// ignored) against the phrase patterns.
    pub fn parse(&self, utterance: &str) -> Option<Intent> {
        let text = utterance.trim().to_lowercase();
        let capture = |re: &Regex| {
            re.captures(&text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
        };

        if let Some(place) = capture(&self.navigate) {
            return Some(Intent::Navigate { place });
        }
        if let Some(action) = capture(&self.zoom) {
            let action = if action == "in" {
                ZoomAction::In
            } else {
                ZoomAction::Out
            };
            return Some(Intent::Zoom(action));
        }
        if let Some(direction) = capture(&self.movement) {
            let direction = match direction.as_str() {
                "up" => Direction::Up,
                "down" => Direction::Down,
                "left" => Direction::Left,
                _ => Direction::Right,
            };
            return Some(Intent::Move(direction));
        }
        if let Some(layer) = capture(&self.show) {
            return Some(Intent::Show { layer });
        }
        if let Some(layer) = capture(&self.hide) {
            return Some(Intent::Hide { layer });
        }
        if let Some(place) = capture(&self.center) {
            return Some(Intent::Center { place });
        }
        capture(&self.marker).map(|place| Intent::Marker { place })
    }

    /// Parses and resolves an utterance into the frame the recognition
    /// service would have sent for it.
    pub fn interpret(&self, utterance: &str, geocoder: &dyn Geocoder) -> Inbound {
        if utterance.trim().is_empty() {
            return Inbound::RecognitionError(NOT_UNDERSTOOD.to_string());
        }
        let Some(intent) = self.parse(utterance) else {
            debug!("no phrase pattern matched {utterance:?}");
            return Inbound::RecognitionError(NOT_RECOGNIZED.to_string());
        };
        match intent.resolve(geocoder) {
            Ok(command) => Inbound::Command(command),
            Err(e) => Inbound::RecognitionError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::LatLng;

    struct OnePlace;

    impl Geocoder for OnePlace {
        fn geocode(&self, place: &str) -> Option<LatLng> {
            (place == "paris").then_some(LatLng::new(48.8566, 2.3522))
        }
    }

    fn grammar() -> Grammar {
        Grammar::new().unwrap()
    }

    #[test]
    fn test_navigate_phrase() {
        assert_eq!(
            grammar().parse("Navigate to New Delhi"),
            Some(Intent::Navigate {
                place: "new delhi".to_string()
            })
        );
    }

    #[test]
    fn test_zoom_and_move_phrases() {
        let g = grammar();
        assert_eq!(g.parse("zoom in"), Some(Intent::Zoom(ZoomAction::In)));
        assert_eq!(g.parse("zoom out please"), Some(Intent::Zoom(ZoomAction::Out)));
        assert_eq!(g.parse("move left"), Some(Intent::Move(Direction::Left)));
        assert_eq!(g.parse("move sideways"), None);
    }

    #[test]
    fn test_show_strips_filler_words() {
        let g = grammar();
        assert_eq!(
            g.parse("show me the satellite layer"),
            Some(Intent::Show {
                layer: "satellite".to_string()
            })
        );
        assert_eq!(
            g.parse("show terrain view"),
            Some(Intent::Show {
                layer: "terrain".to_string()
            })
        );
    }

    #[test]
    fn test_hide_phrase() {
        assert_eq!(
            grammar().parse("hide the road layer"),
            Some(Intent::Hide {
                layer: "road".to_string()
            })
        );
    }

    #[test]
    fn test_center_and_marker_phrases() {
        let g = grammar();
        assert_eq!(
            g.parse("center on paris"),
            Some(Intent::Center {
                place: "paris".to_string()
            })
        );
        assert_eq!(
            g.parse("add a marker at paris"),
            Some(Intent::Marker {
                place: "paris".to_string()
            })
        );
        assert_eq!(
            g.parse("add marker on paris"),
            Some(Intent::Marker {
                place: "paris".to_string()
            })
        );
    }

    #[test]
    fn test_unmatched_phrase() {
        assert_eq!(grammar().parse("make me a sandwich"), None);
    }

    #[test]
    fn test_interpret_resolves_known_place() {
        let inbound = grammar().interpret("navigate to Paris", &OnePlace);
        assert_eq!(
            inbound,
            Inbound::Command(Command::Navigate {
                city: "paris".to_string(),
                latitude: 48.8566,
                longitude: 2.3522,
            })
        );
    }

    #[test]
    fn test_interpret_reports_unknown_place() {
        let inbound = grammar().interpret("center at atlantis", &OnePlace);
        assert_eq!(
            inbound,
            Inbound::RecognitionError(r#"Location "atlantis" not found"#.to_string())
        );
    }

    #[test]
    fn test_interpret_reports_unrecognised_and_empty_input() {
        let g = grammar();
        assert_eq!(
            g.interpret("dance", &OnePlace),
            Inbound::RecognitionError(NOT_RECOGNIZED.to_string())
        );
        assert_eq!(
            g.interpret("   ", &OnePlace),
            Inbound::RecognitionError(NOT_UNDERSTOOD.to_string())
        );
    }
}
