//! Use case: the user-facing controls around the map.
//!
//! Owns the microphone toggle and forwards render requests to a
//! [`UiSurface`].  Display failures are logged and swallowed; nothing the
//! status line or panels do can stop command processing.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use voicemap_core::{HistoryEntry, IndicatorView, LatLng, LayerSelection};

/// Status text while voice capture is on.
pub const LISTENING_STATUS: &str = "Listening...";
/// Status text after voice capture is switched off.
pub const MIC_DISABLED_STATUS: &str = "Microphone disabled";

#[derive(Debug, Error)]
pub enum UiError {
    #[error("failed to render to the console: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the client renders its auxiliary UI.
#[cfg_attr(test, mockall::automock)]
pub trait UiSurface {
    /// Replaces the status line.
    fn set_status(&mut self, text: &str) -> Result<(), UiError>;
    /// Marks `layer` as the selected picker option and shows `label` in the
    /// picker header.
    fn highlight_layer(&mut self, layer: LayerSelection, label: &str) -> Result<(), UiError>;
    /// Re-renders the history panel.
    fn show_history(&mut self, entries: &[HistoryEntry]) -> Result<(), UiError>;
    /// Re-renders the connectivity badge.
    fn show_indicator(&mut self, view: &IndicatorView) -> Result<(), UiError>;
    /// Displays the viewport position.
    fn show_view(&mut self, center: LatLng, zoom: u8) -> Result<(), UiError>;
}

/// The remote side that performs speech capture and recognition.
#[async_trait]
pub trait RecognitionPeer: Send + Sync {
    /// Asks the peer to capture and recognise the next utterance.
    async fn request_listening(&self) -> Result<(), String>;
}

pub struct ControlSurface {
    capture_active: bool,
    ui: Box<dyn UiSurface + Send>,
    peer: Arc<dyn RecognitionPeer>,
}

impl ControlSurface {
    /// Voice capture starts disabled.
    pub fn new(ui: Box<dyn UiSurface + Send>, peer: Arc<dyn RecognitionPeer>) -> Self {
        Self {
            capture_active: false,
            ui,
            peer,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capture_active
    }

    /// Flips voice capture.  Enabling requests listening from the peer
    /// straight away.  Returns the new state.
    pub async fn toggle_mic(&mut self) -> bool {
        self.capture_active = !self.capture_active;
        if self.capture_active {
            self.listen().await;
        } else {
            self.set_status(MIC_DISABLED_STATUS);
        }
        self.capture_active
    }

    /// Called once every inbound message has been handled, whether it was a
    /// command or a recognition error.
    pub async fn after_message(&mut self) {
        if self.capture_active {
            self.listen().await;
        }
    }

    pub fn show_layer(&mut self, layer: LayerSelection) {
        log_failure("layer picker", self.ui.highlight_layer(layer, layer.label()));
    }

    pub fn show_history(&mut self, entries: &[HistoryEntry]) {
        log_failure("history panel", self.ui.show_history(entries));
    }

    pub fn show_indicator(&mut self, view: &IndicatorView) {
        log_failure("connectivity badge", self.ui.show_indicator(view));
    }

    pub fn show_view(&mut self, center: LatLng, zoom: u8) {
        log_failure("viewport", self.ui.show_view(center, zoom));
    }

    pub fn set_status(&mut self, text: &str) {
        log_failure("status line", self.ui.set_status(text));
    }

    async fn listen(&mut self) {
        self.set_status(LISTENING_STATUS);
        if let Err(e) = self.peer.request_listening().await {
            warn!("could not ask the recognition service to listen: {e}");
        }
    }
}

fn log_failure(what: &str, result: Result<(), UiError>) {
    if let Err(e) = result {
        debug!("{what} not updated: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mockall::predicate::eq;

    use super::*;

    #[derive(Default)]
    struct CountingPeer {
        requests: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RecognitionPeer for CountingPeer {
        async fn request_listening(&self) -> Result<(), String> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("injected failure".to_string());
            }
            Ok(())
        }
    }

    fn quiet_ui() -> MockUiSurface {
        let mut ui = MockUiSurface::new();
        ui.expect_set_status().returning(|_| Ok(()));
        ui
    }

    #[tokio::test]
    async fn test_enabling_mic_shows_listening_and_requests_capture() {
        // Arrange
        let mut ui = MockUiSurface::new();
        ui.expect_set_status()
            .with(eq(LISTENING_STATUS))
            .times(1)
            .returning(|_| Ok(()));
        let peer = Arc::new(CountingPeer::default());
        let mut surface = ControlSurface::new(Box::new(ui), peer.clone());

        // Act
        let active = surface.toggle_mic().await;

        // Assert
        assert!(active);
        assert_eq!(peer.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabling_mic_shows_disabled_without_request() {
        let mut ui = MockUiSurface::new();
        ui.expect_set_status()
            .with(eq(LISTENING_STATUS))
            .times(1)
            .returning(|_| Ok(()));
        ui.expect_set_status()
            .with(eq(MIC_DISABLED_STATUS))
            .times(1)
            .returning(|_| Ok(()));
        let peer = Arc::new(CountingPeer::default());
        let mut surface = ControlSurface::new(Box::new(ui), peer.clone());

        surface.toggle_mic().await;
        let active = surface.toggle_mic().await;

        assert!(!active);
        assert_eq!(peer.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_after_message_requests_only_while_capturing() {
        let peer = Arc::new(CountingPeer::default());
        let mut surface = ControlSurface::new(Box::new(quiet_ui()), peer.clone());

        surface.after_message().await;
        assert_eq!(peer.requests.load(Ordering::SeqCst), 0);

        surface.toggle_mic().await;
        surface.after_message().await;
        surface.after_message().await;
        assert_eq!(peer.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_peer_failure_keeps_capture_enabled() {
        let peer = Arc::new(CountingPeer {
            fail: true,
            ..CountingPeer::default()
        });
        let mut surface = ControlSurface::new(Box::new(quiet_ui()), peer);

        surface.toggle_mic().await;

        assert!(surface.is_capturing());
    }

    #[test]
    fn test_ui_failure_is_not_fatal() {
        let mut ui = MockUiSurface::new();
        ui.expect_highlight_layer()
            .with(eq(LayerSelection::Terrain), eq("Terrain View"))
            .times(1)
            .returning(|_, _| Err(UiError::Io(std::io::ErrorKind::BrokenPipe.into())));
        let mut surface = ControlSurface::new(Box::new(ui), Arc::new(CountingPeer::default()));

        surface.show_layer(LayerSelection::Terrain);
    }
}
