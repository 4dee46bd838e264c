//! The mutually exclusive base-layer state machine.
//!
//! Exactly one of the three base layers is attached to the map at any time.
//!
//! ```text
//!            show(x)                       hide(active)
//!   any ───────────────► x          road ──────────► satellite
//!                                   satellite ─────► road
//!                                   terrain ───────► road
//! ```
//!
//! Hiding a layer that is not the active one does nothing.  The hide
//! fallbacks are not symmetric across all three layers; `road` and
//! `satellite` toggle into each other while `terrain` always falls back to
//! `road`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ports::MapView;

/// One of the three base tile layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSelection {
    #[default]
    Road,
    Satellite,
    Terrain,
}

/// A layer name that is not one of road / satellite / terrain.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown layer: {0:?}")]
pub struct UnknownLayer(pub String);

impl LayerSelection {
    pub const ALL: [LayerSelection; 3] = [
        LayerSelection::Road,
        LayerSelection::Satellite,
        LayerSelection::Terrain,
    ];

    /// Lower-case identifier, as used on the wire and in the picker.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerSelection::Road => "road",
            LayerSelection::Satellite => "satellite",
            LayerSelection::Terrain => "terrain",
        }
    }

    /// Text shown in the layer picker header.
    pub fn label(self) -> &'static str {
        match self {
            LayerSelection::Road => "Road Layer",
            LayerSelection::Satellite => "Satellite View",
            LayerSelection::Terrain => "Terrain View",
        }
    }

    /// Layer attached when this one is hidden while active.
    pub fn hide_fallback(self) -> LayerSelection {
        match self {
            LayerSelection::Road => LayerSelection::Satellite,
            LayerSelection::Satellite => LayerSelection::Road,
            LayerSelection::Terrain => LayerSelection::Road,
        }
    }

    /// Interprets a layer name as spoken: case-insensitive, surrounding
    /// whitespace ignored, with an optional leading `the` and an optional
    /// trailing `layer` or `view`.
    pub fn from_spoken(name: &str) -> Option<LayerSelection> {
        let lowered = name.trim().to_lowercase();
        let mut word = lowered.as_str();
        word = word.strip_prefix("the ").unwrap_or(word).trim_start();
        for suffix in [" layer", " view"] {
            if let Some(stripped) = word.strip_suffix(suffix) {
                word = stripped.trim_end();
                break;
            }
        }
        Self::ALL.into_iter().find(|layer| layer.as_str() == word)
    }
}

impl FromStr for LayerSelection {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_spoken(s).ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

impl std::fmt::Display for LayerSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a [`LayerStateMachine`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerTransition {
    /// `current` is now the only attached layer.
    Applied {
        previous: LayerSelection,
        current: LayerSelection,
    },
    /// A hide targeted a layer that was not active; nothing changed.
    NotActive,
}

/// Owns which base layer is attached to the map.
#[derive(Debug)]
pub struct LayerStateMachine {
    current: LayerSelection,
}

impl LayerStateMachine {
    /// Attaches the default layer (`road`) to `map` and returns the machine
    /// tracking it.
    pub fn attach_initial(map: &mut dyn MapView) -> Self {
        let mut machine = Self {
            current: LayerSelection::default(),
        };
        machine.attach(map, LayerSelection::default());
        machine
    }

    /// The attached layer.  The UI highlight always mirrors this value.
    pub fn current(&self) -> LayerSelection {
        self.current
    }

    /// Picker header text for the attached layer.
    pub fn label(&self) -> &'static str {
        self.current.label()
    }

    /// Shows or hides `layer`.
    ///
    /// Showing detaches the other two layers and attaches `layer`.  Hiding
    /// the active layer attaches its [`LayerSelection::hide_fallback`];
    /// hiding any other layer returns [`LayerTransition::NotActive`].
    pub fn set_visible(
        &mut self,
        map: &mut dyn MapView,
        layer: LayerSelection,
        show: bool,
    ) -> LayerTransition {
        let target = if show {
            layer
        } else if layer == self.current {
            layer.hide_fallback()
        } else {
            debug!("hide {layer} ignored: {} is active", self.current);
            return LayerTransition::NotActive;
        };

        let previous = self.current;
        self.attach(map, target);
        LayerTransition::Applied {
            previous,
            current: target,
        }
    }

    /// User selection through the layer picker.  Always uses show semantics.
    pub fn select(&mut self, map: &mut dyn MapView, layer: LayerSelection) -> LayerTransition {
        self.set_visible(map, layer, true)
    }

    fn attach(&mut self, map: &mut dyn MapView, layer: LayerSelection) {
        for other in LayerSelection::ALL.into_iter().filter(|l| *l != layer) {
            map.remove_layer(other);
        }
        map.add_layer(layer);
        self.current = layer;
    }
}
