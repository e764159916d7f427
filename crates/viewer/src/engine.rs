//! The seam to the external map renderer.
//!
//! The real engine (tile renderer plus slippy-map widget) lives outside this
//! repository; the viewer drives it exclusively through this trait. The
//! recording implementation backs tests and the headless CLI.

use foundation::{LngLatBounds, MapView};
use scene::{Feature, SceneConfig};

pub trait MapEngine {
    /// Full scene load from a fresh configuration. Discards any in-memory
    /// mutations applied to a previously loaded scene.
    fn load_scene(&mut self, config: &SceneConfig);

    /// Recomputes derived engine state from the (mutated) configuration.
    /// Config mutations are invisible until this is called.
    fn apply_config(&mut self, config: &SceneConfig);

    fn set_view(&mut self, view: MapView);

    fn fit_bounds(&mut self, bounds: LngLatBounds);

    /// Features currently rendered in the viewport for one data source.
    fn query_source_features(&mut self, source: &str) -> Vec<Feature>;

    /// PNG bytes of the current frame, if the engine supports capture.
    fn screenshot(&mut self) -> Option<Vec<u8>>;
}

/// Records every call and replays canned viewport features.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub loaded_scenes: Vec<SceneConfig>,
    pub applied_configs: Vec<SceneConfig>,
    pub views: Vec<MapView>,
    pub fitted_bounds: Vec<LngLatBounds>,
    pub queried_sources: Vec<String>,
    /// Returned from every viewport query.
    pub viewport_features: Vec<Feature>,
    pub screenshot_png: Option<Vec<u8>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(features: Vec<Feature>) -> Self {
        RecordingEngine {
            viewport_features: features,
            ..Self::default()
        }
    }
}

impl MapEngine for RecordingEngine {
    fn load_scene(&mut self, config: &SceneConfig) {
        self.loaded_scenes.push(config.clone());
    }

    fn apply_config(&mut self, config: &SceneConfig) {
        self.applied_configs.push(config.clone());
    }

    fn set_view(&mut self, view: MapView) {
        self.views.push(view);
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds) {
        self.fitted_bounds.push(bounds);
    }

    fn query_source_features(&mut self, source: &str) -> Vec<Feature> {
        self.queried_sources.push(source.to_string());
        self.viewport_features.clone()
    }

    fn screenshot(&mut self) -> Option<Vec<u8>> {
        self.screenshot_png.clone()
    }
}
