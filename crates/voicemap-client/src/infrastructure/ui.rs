//! Console rendering of the client UI.
//!
//! Each update is written as one or more plain-text lines:
//!
//! ```text
//! [status] Listening...
//! [layer] Satellite View  ( ) road  (*) satellite  ( ) terrain
//! [history] 1718000000123  Navigated to paris
//! [network] Offline
//! [view] 48.8566, 2.3522 @ 13
//! ```

use std::io::Write;

use voicemap_core::{HistoryEntry, IndicatorView, LatLng, LayerSelection};

use crate::application::control_surface::{UiError, UiSurface};

pub struct ConsoleSurface {
    out: Box<dyn Write + Send>,
    last_indicator: Option<IndicatorView>,
}

impl ConsoleSurface {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            last_indicator: None,
        }
    }

    /// Renders to standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl UiSurface for ConsoleSurface {
    fn set_status(&mut self, text: &str) -> Result<(), UiError> {
        writeln!(self.out, "[status] {text}")?;
        Ok(self.out.flush()?)
    }

    fn highlight_layer(&mut self, layer: LayerSelection, label: &str) -> Result<(), UiError> {
        let options: Vec<String> = LayerSelection::ALL
            .into_iter()
            .map(|option| {
                let mark = if option == layer { '*' } else { ' ' };
                format!("({mark}) {option}")
            })
            .collect();
        writeln!(self.out, "[layer] {label}  {}", options.join("  "))?;
        Ok(self.out.flush()?)
    }

    fn show_history(&mut self, entries: &[HistoryEntry]) -> Result<(), UiError> {
        if entries.is_empty() {
            writeln!(self.out, "[history] (empty)")?;
        }
        for entry in entries {
            writeln!(self.out, "[history] {}  {}", entry.id, entry.text)?;
        }
        Ok(self.out.flush()?)
    }

    fn show_indicator(&mut self, view: &IndicatorView) -> Result<(), UiError> {
        // Only visibility and message changes are worth a line; the
        // entrance and exit flags are animation detail.
        let unchanged = match &self.last_indicator {
            Some(last) => last.visible == view.visible && last.message == view.message,
            None => !view.visible,
        };
        self.last_indicator = Some(view.clone());
        if unchanged {
            return Ok(());
        }
        if view.visible {
            writeln!(self.out, "[network] {}", view.message)?;
        } else {
            writeln!(self.out, "[network] (hidden)")?;
        }
        Ok(self.out.flush()?)
    }

    fn show_view(&mut self, center: LatLng, zoom: u8) -> Result<(), UiError> {
        writeln!(self.out, "[view] {:.4}, {:.4} @ {zoom}", center.lat, center.lng)?;
        Ok(self.out.flush()?)
    }
}
