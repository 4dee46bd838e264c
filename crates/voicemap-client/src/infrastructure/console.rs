//! Console controls.
//!
//! Lines starting with `:` are control commands; any other non-empty line is
//! an utterance, resolved locally with the grammar and gazetteer and posted
//! to the event queue exactly as if the recognition service had sent it.
//!
//! | Line               | Effect                                   |
//! |--------------------|------------------------------------------|
//! | `:mic`             | Toggle voice capture                     |
//! | `:layer <name>`    | Select a base layer in the picker        |
//! | `:delete <id>`     | Delete a history entry                   |
//! | `:history`         | Print the history panel                  |
//! | `:quit`            | Stop the client                          |

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use voicemap_core::{Geocoder, Grammar, LayerSelection};

use crate::application::event_loop::{ClientEvent, UserAction};

pub const USAGE: &str = "commands: :mic | :layer <road|satellite|terrain> | :delete <id> | :history | :quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Action(UserAction),
    Quit,
    Utterance(String),
    /// A control command that could not be parsed; the payload explains why.
    Invalid(String),
}

/// Parses one line.  Blank lines yield `None`.
pub fn parse_console_line(line: &str) -> Option<ConsoleInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(control) = line.strip_prefix(':') else {
        return Some(ConsoleInput::Utterance(line.to_string()));
    };

    let (word, arg) = match control.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (control, ""),
    };
    let input = match word.to_lowercase().as_str() {
        "mic" => ConsoleInput::Action(UserAction::ToggleMic),
        "history" => ConsoleInput::Action(UserAction::ShowHistory),
        "quit" | "exit" => ConsoleInput::Quit,
        "layer" => match arg.parse::<LayerSelection>() {
            Ok(layer) => ConsoleInput::Action(UserAction::SelectLayer(layer)),
            Err(e) => ConsoleInput::Invalid(e.to_string()),
        },
        "delete" => match arg.parse::<u64>() {
            Ok(id) => ConsoleInput::Action(UserAction::DeleteHistory(id)),
            Err(_) => ConsoleInput::Invalid(format!("not a history id: {arg:?}")),
        },
        other => ConsoleInput::Invalid(format!("unknown command :{other}; {USAGE}")),
    };
    Some(input)
}

/// Reads `input` line by line, posting events until `:quit`, end of input,
/// or the event loop going away.
pub async fn run_console<R>(
    input: R,
    events: mpsc::Sender<ClientEvent>,
    grammar: Grammar,
    geocoder: Box<dyn Geocoder + Send>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read console input")? {
        let event = match parse_console_line(&line) {
            None => continue,
            Some(ConsoleInput::Invalid(reason)) => {
                warn!("{reason}");
                continue;
            }
            Some(ConsoleInput::Quit) => ClientEvent::Shutdown,
            Some(ConsoleInput::Action(action)) => ClientEvent::User(action),
            Some(ConsoleInput::Utterance(text)) => {
                ClientEvent::Transport(grammar.interpret(&text, geocoder.as_ref()))
            }
        };
        let quitting = event == ClientEvent::Shutdown;
        if events.send(event).await.is_err() {
            debug!("event loop gone; console reader exiting");
            return Ok(());
        }
        if quitting {
            return Ok(());
        }
    }
    debug!("console input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use voicemap_core::{Command, Inbound, LatLng, ZoomAction};

    use super::*;

    struct Nowhere;

    impl Geocoder for Nowhere {
        fn geocode(&self, _place: &str) -> Option<LatLng> {
            None
        }
    }

    #[test]
    fn test_control_commands_parse() {
        assert_eq!(
            parse_console_line(":mic"),
            Some(ConsoleInput::Action(UserAction::ToggleMic))
        );
        assert_eq!(
            parse_console_line(":layer Terrain"),
            Some(ConsoleInput::Action(UserAction::SelectLayer(LayerSelection::Terrain)))
        );
        assert_eq!(
            parse_console_line(" :delete 42 "),
            Some(ConsoleInput::Action(UserAction::DeleteHistory(42)))
        );
        assert_eq!(parse_console_line(":quit"), Some(ConsoleInput::Quit));
    }

    #[test]
    fn test_bad_control_arguments_are_invalid() {
        assert!(matches!(
            parse_console_line(":layer hybrid"),
            Some(ConsoleInput::Invalid(_))
        ));
        assert!(matches!(
            parse_console_line(":delete latest"),
            Some(ConsoleInput::Invalid(_))
        ));
        assert!(matches!(
            parse_console_line(":fly"),
            Some(ConsoleInput::Invalid(_))
        ));
    }

    #[test]
    fn test_plain_text_is_an_utterance_and_blank_is_nothing() {
        assert_eq!(
            parse_console_line("zoom in"),
            Some(ConsoleInput::Utterance("zoom in".to_string()))
        );
        assert_eq!(parse_console_line("   "), None);
    }

    #[tokio::test]
    async fn test_console_posts_events_until_quit() {
        // Arrange
        let input: &[u8] = b"zoom in\n\n:mic\nnavigate to atlantis\n:quit\nzoom out\n";
        let (tx, mut rx) = mpsc::channel(16);

        // Act
        run_console(input, tx, Grammar::new().unwrap(), Box::new(Nowhere))
            .await
            .unwrap();

        // Assert
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                ClientEvent::Transport(Inbound::Command(Command::Zoom {
                    action: ZoomAction::In
                })),
                ClientEvent::User(UserAction::ToggleMic),
                ClientEvent::Transport(Inbound::RecognitionError(
                    r#"Location "atlantis" not found"#.to_string()
                )),
                ClientEvent::Shutdown,
            ]
        );
    }
}
