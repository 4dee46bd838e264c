//! Use case: apply one recognised command to the map and its UI state.
//!
//! The dispatcher owns the map view together with every component a command
//! can touch.  Each call to [`CommandDispatcher::dispatch`] runs to
//! completion before the caller can issue the next one, which is what keeps
//! command processing strictly ordered.

use tracing::{debug, info, warn};
use voicemap_core::{
    Command, CommandKind, HistoryStore, LatLng, LayerSelection, LayerStateMachine,
    LayerTransition, MapView, MarkerManager, ZoomAction,
};

/// Fixed parameters of the command-to-map mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Zoom level used when navigating to a place.
    pub navigate_zoom: u8,
    /// Pixel distance of one `move` step.
    pub pan_step: i32,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            navigate_zoom: 13,
            pan_step: 100,
        }
    }
}

/// What a dispatch changed beyond the map itself, so the caller knows which
/// UI elements to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub kind: CommandKind,
    /// Set when the attached base layer was (re)applied.
    pub layer: Option<LayerSelection>,
    /// Set when the history list was modified.
    pub history_changed: bool,
}

impl DispatchReport {
    fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            layer: None,
            history_changed: false,
        }
    }
}

pub struct CommandDispatcher {
    map: Box<dyn MapView + Send>,
    markers: MarkerManager,
    layers: LayerStateMachine,
    history: HistoryStore,
    settings: DispatchSettings,
}

impl CommandDispatcher {
    /// Takes ownership of `map`, attaching the default base layer to it.
    pub fn new(
        mut map: Box<dyn MapView + Send>,
        history: HistoryStore,
        settings: DispatchSettings,
    ) -> Self {
        let layers = LayerStateMachine::attach_initial(map.as_mut());
        Self {
            map,
            markers: MarkerManager::new(),
            layers,
            history,
            settings,
        }
    }

    /// Applies `command`.  Never fails: a command that cannot be applied
    /// (an unknown layer name) is logged and leaves every component as it was.
    pub fn dispatch(&mut self, command: Command) -> DispatchReport {
        let mut report = DispatchReport::new(command.kind());
        debug!(kind = %report.kind, "dispatching command");

        match command {
            Command::Navigate {
                city,
                latitude,
                longitude,
            } => {
                let at = LatLng::new(latitude, longitude);
                self.markers.clear_markers(self.map.as_mut());
                self.markers.add_marker(self.map.as_mut(), at);
                self.map.set_view(at, self.settings.navigate_zoom);
                info!("navigated to {city} ({latitude:.4}, {longitude:.4})");
                report.history_changed = self.record(&format!("Navigated to {city}"));
            }
            Command::Zoom { action } => match action {
                ZoomAction::In => self.map.zoom_in(),
                ZoomAction::Out => self.map.zoom_out(),
            },
            Command::Move { direction } => {
                let (dx, dy) = direction.pan_offset(self.settings.pan_step);
                self.map.pan_by(dx, dy);
            }
            Command::Show { layer } => report.layer = self.set_layer(&layer, true),
            Command::Hide { layer } => report.layer = self.set_layer(&layer, false),
            Command::Center {
                latitude,
                longitude,
            } => {
                let zoom = self.map.zoom();
                self.map.set_view(LatLng::new(latitude, longitude), zoom);
            }
            Command::Marker {
                latitude,
                longitude,
            } => {
                self.markers
                    .add_marker(self.map.as_mut(), LatLng::new(latitude, longitude));
            }
        }
        report
    }

    /// Layer picker selection.  Always attaches `layer`.
    pub fn select_layer(&mut self, layer: LayerSelection) -> LayerSelection {
        self.layers.select(self.map.as_mut(), layer);
        self.layers.current()
    }

    /// Deletes a history entry on user request.  Returns whether an entry
    /// was removed.
    pub fn delete_history(&mut self, id: u64) -> bool {
        let present = self.history.entries().iter().any(|e| e.id == id);
        match self.history.delete(id) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("history delete of {id} not persisted: {e}");
                present
            }
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn layers(&self) -> &LayerStateMachine {
        &self.layers
    }

    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    pub fn map(&self) -> &dyn MapView {
        self.map.as_ref()
    }

    fn set_layer(&mut self, spoken: &str, show: bool) -> Option<LayerSelection> {
        let Some(layer) = LayerSelection::from_spoken(spoken) else {
            warn!("unknown layer {spoken:?}, command ignored");
            return None;
        };
        match self.layers.set_visible(self.map.as_mut(), layer, show) {
            LayerTransition::Applied { current, .. } => Some(current),
            LayerTransition::NotActive => None,
        }
    }

    fn record(&mut self, text: &str) -> bool {
        match self.history.append(text) {
            Ok(id) => id.is_some(),
            Err(e) => {
                // The entry is in memory; only the durable copy is behind.
                warn!("history entry not persisted: {e}");
                true
            }
        }
    }
}
