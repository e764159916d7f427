//! Display-option registry.
//!
//! Each option maps a UI toggle to a scene-configuration mutation. Options
//! only mutate the config; making the change visible is the orchestrator's
//! job via the engine's apply step.

use scene::{
    BUILDINGS_LAYER, DOTS_LAYER, LABELS_LAYER, LINES_LAYER, POLYGONS_LAYER, ROADS_LAYER,
    SceneConfig,
};

use crate::state::{ToggleValue, UiState};

pub struct DisplayOption {
    pub name: &'static str,
    pub apply: fn(&mut SceneConfig, ToggleValue, &UiState),
}

/// Registered options in application order.
pub const DISPLAY_OPTIONS: &[DisplayOption] = &[
    DisplayOption {
        name: "points",
        apply: |config, value, _| {
            if let Some(px) = value.as_number() {
                config.set_point_size(DOTS_LAYER, px);
            }
        },
    },
    DisplayOption {
        name: "dots",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                config.set_layer_visible(DOTS_LAYER, on);
            }
        },
    },
    DisplayOption {
        name: "lines",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                config.set_layer_visible(LINES_LAYER, on);
            }
        },
    },
    DisplayOption {
        name: "polygons",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                config.set_layer_visible(POLYGONS_LAYER, on);
            }
        },
    },
    DisplayOption {
        name: "buildings",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                config.set_layer_visible(BUILDINGS_LAYER, on);
            }
        },
    },
    DisplayOption {
        name: "roads",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                config.set_layer_visible(ROADS_LAYER, on);
            }
        },
    },
    DisplayOption {
        name: "labels",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                config.set_layer_visible(LABELS_LAYER, on);
            }
        },
    },
    DisplayOption {
        name: "colors",
        apply: |config, value, _| {
            if let Some(on) = value.as_flag() {
                let (dots, lines) = if on {
                    (HIGHLIGHT_DOTS, HIGHLIGHT_LINES)
                } else {
                    (NEUTRAL_OVERLAY, NEUTRAL_OVERLAY)
                };
                config.set_layer_color(DOTS_LAYER, dots);
                config.set_layer_color(LINES_LAYER, lines);
            }
        },
    },
];

const HIGHLIGHT_DOTS: [f64; 4] = [0.0, 0.0, 1.0, 0.5];
const HIGHLIGHT_LINES: [f64; 4] = [1.0, 0.0, 0.0, 0.5];
const NEUTRAL_OVERLAY: [f64; 4] = [1.0, 1.0, 1.0, 0.5];

/// Applies every registered option that has a value in the UI state.
pub fn apply_display_options(config: &mut SceneConfig, state: &UiState) {
    for option in DISPLAY_OPTIONS {
        if let Some(value) = state.toggle(option.name) {
            (option.apply)(config, value, state);
        }
    }
}
