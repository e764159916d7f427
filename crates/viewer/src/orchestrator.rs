//! The map/scene orchestrator.
//!
//! Owns the single mutable scene configuration and the engine handle, and
//! wires UI events, engine lifecycle events, and the statistics reducer
//! together. The scene config is created lazily on the first basemap load;
//! every mutation batch ends with an explicit `apply_config` on the engine.

use basemaps::{BasemapDescriptor, BasemapRef, default_name, next_name, resolve};
use catalog::{
    CatalogError, SpaceClient, SpaceInfo, SpaceStatistics, ViewDecision, decide_view,
    display_bounds, format_count, format_size,
};
use compute::reduce_viewport;
use foundation::MapView;
use scene::{Feature, PropertyPath, PropertyValue, SPACE_SOURCE, SceneConfig};
use tracing::{debug, info, warn};

use crate::display::apply_display_options;
use crate::engine::MapEngine;
use crate::state::{SpacePanel, UiState};

#[derive(Debug)]
pub enum ViewerError {
    UnknownBasemap(String),
    Catalog(CatalogError),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::UnknownBasemap(name) => write!(f, "unknown basemap: {name}"),
            ViewerError::Catalog(e) => write!(f, "space load failed: {e}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Catalog(e) => Some(e),
            ViewerError::UnknownBasemap(_) => None,
        }
    }
}

impl From<CatalogError> for ViewerError {
    fn from(e: CatalogError) -> Self {
        ViewerError::Catalog(e)
    }
}

pub struct Viewer<E: MapEngine> {
    engine: E,
    client: SpaceClient,
    state: UiState,
    /// `None` until the first basemap load creates the layer.
    config: Option<SceneConfig>,
    /// Bumped per space load; resolutions carrying an older generation are
    /// stale and must not write state.
    fetch_generation: u64,
}

impl<E: MapEngine> Viewer<E> {
    pub fn new(engine: E, client: SpaceClient) -> Self {
        let mut state = UiState::default();
        state.basemap = default_name().to_string();
        Viewer {
            engine,
            client,
            state,
            config: None,
            fetch_generation: 0,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn scene_config(&self) -> Option<&SceneConfig> {
        self.config.as_ref()
    }

    /// Loads the basemap named in UI state (or the default when unset).
    pub fn load_initial_basemap(&mut self) -> Result<(), ViewerError> {
        let name = self.state.basemap.clone();
        self.select_basemap(BasemapRef::ByName(&name))
    }

    /// Selecting a basemap is a full scene rebuild from its descriptor,
    /// never a patch of the live config.
    pub fn select_basemap(&mut self, selector: BasemapRef<'_>) -> Result<(), ViewerError> {
        let Some(descriptor) = resolve(selector) else {
            let label = match selector {
                BasemapRef::ByName(name) => name.to_string(),
                BasemapRef::ByLegacyIndex(i) => format!("#{i}"),
            };
            return Err(ViewerError::UnknownBasemap(label));
        };
        self.load_descriptor(descriptor);
        Ok(())
    }

    /// Advances to the next basemap in declared order, wrapping.
    pub fn cycle_basemap(&mut self) {
        let next = next_name(&self.state.basemap);
        // Cycling from a registered name cannot miss.
        let descriptor = resolve(BasemapRef::ByName(next)).unwrap_or(&basemaps::BASEMAPS[0]);
        self.load_descriptor(descriptor);
    }

    fn load_descriptor(&mut self, descriptor: &BasemapDescriptor) {
        info!(basemap = descriptor.name, "loading basemap scene");
        self.state.basemap = descriptor.name.to_string();
        let config = descriptor.build_scene();
        self.engine.load_scene(&config);
        self.config = Some(config);
        // The engine answers with a scene-loaded event once the bundles are
        // in; current UI state is re-applied there.
    }

    /// Engine "scene loaded" event: a reload discarded any prior in-memory
    /// mutations, so the full current UI state is re-applied to the fresh
    /// config.
    pub fn on_scene_loaded(&mut self) {
        self.update_scene();
    }

    /// Applies the current UI state to the owned config, then asks the
    /// engine to recompute. Mutation order matches application order:
    /// space source, display options, tag filter.
    pub fn update_scene(&mut self) {
        let Some(config) = self.config.as_mut() else {
            return;
        };

        if let (Some(space_id), Some(token)) = (&self.state.space_id, &self.state.access_token) {
            config.set_space_source(self.client.tile_url(space_id), token);
        }

        apply_display_options(config, &self.state);
        config.set_tag_filter(self.state.tag_filter.as_deref());

        self.engine.apply_config(config);
    }

    /// Engine "view settled" event: reduce the live viewport features and
    /// publish the summary to UI state.
    pub fn on_view_complete(&mut self) {
        let features = self.engine.query_source_features(SPACE_SOURCE);
        debug!(count = features.len(), "features in viewport");

        let summary = reduce_viewport(&features, self.state.property_path.as_ref());
        self.state
            .seed_tags(summary.tag_counts.iter().map(|(t, _)| t.clone()));
        self.state.viewport = summary;
    }

    pub fn set_property_path(&mut self, path: Option<PropertyPath>) {
        self.state.property_path = path.filter(|p| !p.is_empty());
        // The next settled view recomputes; reduce immediately so the panel
        // does not show stale figures for the old property.
        self.on_view_complete();
    }

    pub fn set_tag_filter(&mut self, tags: Option<String>) {
        self.state.tag_filter = tags.filter(|t| !t.is_empty());
        // Changing the tile query parameter makes the engine refetch tiles.
        self.update_scene();
    }

    /// Fetches statistics and metadata for a space and applies the result.
    /// Returns `false` when the resolution was stale (a newer load started
    /// while this one was in flight) and state was left untouched.
    pub async fn load_space(
        &mut self,
        space_id: &str,
        access_token: &str,
        start: Option<MapView>,
    ) -> Result<bool, ViewerError> {
        let generation = self.begin_space_load();
        let stats = self.client.fetch_statistics(space_id, access_token).await?;
        let info = self.client.fetch_space_info(space_id, access_token).await?;
        Ok(self.finish_space_load(generation, space_id, access_token, stats, info, start))
    }

    /// Starts a space load, invalidating any still-in-flight one.
    pub fn begin_space_load(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.fetch_generation
    }

    /// Applies a resolved space load unless a newer one has started since.
    pub fn finish_space_load(
        &mut self,
        generation: u64,
        space_id: &str,
        access_token: &str,
        stats: SpaceStatistics,
        info: SpaceInfo,
        start: Option<MapView>,
    ) -> bool {
        if generation != self.fetch_generation {
            warn!(space_id, "dropping stale space load result");
            return false;
        }

        let bounds = display_bounds(stats.bbox);
        match decide_view(start, bounds) {
            ViewDecision::KeepStart(view) => {
                debug!(?view, "start location inside bbox, keeping view");
                self.engine.set_view(view);
            }
            ViewDecision::FitBounds(bounds) => {
                debug!(?bounds, "fitting view to space bounds");
                self.engine.fit_bounds(bounds);
            }
        }

        self.state.space_id = Some(space_id.to_string());
        self.state.access_token = Some(access_token.to_string());
        self.state.space = Some(SpacePanel {
            title: info.title,
            description: info.description,
            feature_count: format_count(stats.feature_count),
            data_size: format_size(stats.byte_size),
        });
        self.state.seed_tags(stats.tags);

        self.update_scene();
        true
    }

    /// File name for a screenshot export, derived from the shareable query
    /// parameters.
    pub fn screenshot_name(&self) -> String {
        format!("spaceview-{}.png", self.state.query_params())
    }

    /// Captures the current frame, returning the download file name and the
    /// PNG bytes. `None` when the engine cannot capture.
    pub fn take_screenshot(&mut self) -> Option<(String, Vec<u8>)> {
        let png = self.engine.screenshot()?;
        Some((self.screenshot_name(), png))
    }
}

/// Hover-tooltip rows for a feature: id, name, and the selected property's
/// resolved value. Rows whose value is missing or blank are omitted.
pub fn feature_tooltip_rows(feature: &Feature, state: &UiState) -> Vec<(String, String)> {
    let mut rows = Vec::new();

    for key in ["id", "name"] {
        if let Some(value) = feature.property(&PropertyPath::key(key)) {
            let text = value.to_string();
            if !text.is_empty() && !value.is_null() {
                rows.push((key.to_string(), text));
            }
        }
    }

    if let Some(path) = &state.property_path {
        if !path.is_empty() {
            let label = scene::format_path(path);
            let value = feature
                .property(path)
                .cloned()
                .unwrap_or(PropertyValue::Null);
            rows.push((label, value.to_string()));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordingEngine;
    use crate::state::ToggleValue;
    use foundation::LngLatBounds;
    use pretty_assertions::assert_eq;
    use scene::{DOTS_LAYER, TAGS_PARAM};

    fn viewer_with(engine: RecordingEngine) -> Viewer<RecordingEngine> {
        Viewer::new(engine, SpaceClient::new("https://xyz.example/hub/spaces"))
    }

    fn stats_with_bbox(bbox: [f64; 4]) -> SpaceStatistics {
        SpaceStatistics {
            bbox,
            byte_size: 2_097_152,
            feature_count: 1_500,
            tags: vec!["roads".to_string()],
        }
    }

    fn info() -> SpaceInfo {
        SpaceInfo {
            title: "Test space".to_string(),
            description: "desc".to_string(),
        }
    }

    #[test]
    fn basemap_selection_rebuilds_the_scene() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.select_basemap(BasemapRef::ByName("refill")).unwrap();
        assert_eq!(viewer.state().basemap, "refill");
        assert_eq!(viewer.engine().loaded_scenes.len(), 1);

        viewer.select_basemap(BasemapRef::ByLegacyIndex(0)).unwrap();
        assert_eq!(viewer.state().basemap, "dots");
        assert_eq!(viewer.engine().loaded_scenes.len(), 2);
    }

    #[test]
    fn unknown_basemap_is_an_error() {
        let mut viewer = viewer_with(RecordingEngine::new());
        assert!(matches!(
            viewer.select_basemap(BasemapRef::ByName("nope")),
            Err(ViewerError::UnknownBasemap(_))
        ));
        assert!(matches!(
            viewer.select_basemap(BasemapRef::ByLegacyIndex(99)),
            Err(ViewerError::UnknownBasemap(_))
        ));
        // Nothing reached the engine.
        assert!(viewer.engine().loaded_scenes.is_empty());
    }

    #[test]
    fn cycle_advances_through_declared_order() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        let first = viewer.state().basemap.clone();
        viewer.cycle_basemap();
        assert_ne!(viewer.state().basemap, first);
    }

    #[test]
    fn scene_loaded_reapplies_ui_state() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        viewer.state_mut().space_id = Some("s1".to_string());
        viewer.state_mut().access_token = Some("tok".to_string());
        viewer.state_mut().tag_filter = Some("roads".to_string());
        viewer
            .state_mut()
            .set_toggle("points", ToggleValue::Number(7.0));

        viewer.on_scene_loaded();

        let applied = viewer.engine().applied_configs.last().unwrap();
        let source = &applied.sources[SPACE_SOURCE];
        assert_eq!(
            source.url,
            "https://xyz.example/hub/spaces/s1/tile/web/{z}_{x}_{y}"
        );
        assert_eq!(source.url_params.get("access_token").map(String::as_str), Some("tok"));
        assert_eq!(source.url_params.get(TAGS_PARAM).map(String::as_str), Some("roads"));
        assert_eq!(applied.layers[DOTS_LAYER].draw.point_size_px, Some(7.0));
    }

    #[test]
    fn update_scene_before_any_basemap_is_a_no_op() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.update_scene();
        assert!(viewer.engine().applied_configs.is_empty());
    }

    #[test]
    fn view_complete_publishes_viewport_summary() {
        let features = vec![
            Feature::from_json(serde_json::json!({
                "pop": 10, "@ns:com:here:xyz": { "tags": ["roads"] }
            })),
            Feature::from_json(serde_json::json!({
                "pop": 30, "@ns:com:here:xyz": { "tags": ["roads", "parks"] }
            })),
        ];
        let mut viewer = viewer_with(RecordingEngine::with_viewport(features));
        viewer.state_mut().property_path = Some(PropertyPath::key("pop"));

        viewer.on_view_complete();

        assert_eq!(viewer.engine().queried_sources, vec![SPACE_SOURCE.to_string()]);
        let summary = &viewer.state().viewport;
        assert_eq!(summary.feature_count, 2);
        assert_eq!(summary.tag_counts[0], ("roads".to_string(), 2));
        let numeric = summary.property.as_ref().unwrap().numeric.as_ref().unwrap();
        assert_eq!(numeric.mean, 20.0);
        // Viewport tags accumulate into the unique set.
        assert!(viewer.state().unique_tags.contains("parks"));
    }

    #[test]
    fn finish_space_load_fits_bounds_when_start_is_outside() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        let generation = viewer.begin_space_load();
        let start = MapView::new(50.0, 50.0, 5.0);

        let applied = viewer.finish_space_load(
            generation,
            "s1",
            "tok",
            stats_with_bbox([-10.0, -10.0, 10.0, 10.0]),
            info(),
            Some(start),
        );

        assert!(applied);
        assert!(viewer.engine().views.is_empty());
        assert_eq!(
            viewer.engine().fitted_bounds,
            vec![LngLatBounds::from_wsen([-10.0, -10.0, 10.0, 10.0])]
        );
    }

    #[test]
    fn finish_space_load_keeps_inside_start_view() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        let generation = viewer.begin_space_load();
        let start = MapView::new(5.0, 5.0, 9.0);

        viewer.finish_space_load(
            generation,
            "s1",
            "tok",
            stats_with_bbox([-10.0, -10.0, 10.0, 10.0]),
            info(),
            Some(start),
        );

        assert_eq!(viewer.engine().views, vec![start]);
        assert!(viewer.engine().fitted_bounds.is_empty());
    }

    #[test]
    fn degenerate_bbox_uses_fallback_bounds() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        let generation = viewer.begin_space_load();

        viewer.finish_space_load(
            generation,
            "s1",
            "tok",
            stats_with_bbox([0.0, 0.0, 0.0, 0.0]),
            info(),
            None,
        );

        assert_eq!(
            viewer.engine().fitted_bounds,
            vec![LngLatBounds::from_wsen([-45.0, -45.0, 45.0, 45.0])]
        );
    }

    #[test]
    fn stale_space_load_is_dropped() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();

        let older = viewer.begin_space_load();
        let newer = viewer.begin_space_load();

        let applied = viewer.finish_space_load(
            older,
            "old-space",
            "tok",
            stats_with_bbox([-10.0, -10.0, 10.0, 10.0]),
            info(),
            None,
        );
        assert!(!applied);
        assert!(viewer.state().space.is_none());
        assert!(viewer.engine().fitted_bounds.is_empty());

        let applied = viewer.finish_space_load(
            newer,
            "new-space",
            "tok",
            stats_with_bbox([-10.0, -10.0, 10.0, 10.0]),
            info(),
            None,
        );
        assert!(applied);
        assert_eq!(viewer.state().space_id.as_deref(), Some("new-space"));
    }

    #[test]
    fn finish_space_load_fills_the_space_panel() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        let generation = viewer.begin_space_load();

        viewer.finish_space_load(
            generation,
            "s1",
            "tok",
            stats_with_bbox([-1.0, -1.0, 1.0, 1.0]),
            info(),
            None,
        );

        let panel = viewer.state().space.as_ref().unwrap();
        assert_eq!(panel.title, "Test space");
        assert_eq!(panel.feature_count, "1.5K");
        assert_eq!(panel.data_size, "2.0 MB");
        assert!(viewer.state().unique_tags.contains("roads"));
    }

    #[test]
    fn screenshot_name_reflects_query_params() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.state_mut().space_id = Some("s1".to_string());
        assert!(viewer.screenshot_name().starts_with("spaceview-space=s1"));
        assert!(viewer.screenshot_name().ends_with(".png"));

        assert!(viewer.take_screenshot().is_none());
        viewer.engine.screenshot_png = Some(vec![1, 2, 3]);
        let (name, png) = viewer.take_screenshot().unwrap();
        assert_eq!(png, vec![1, 2, 3]);
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn tag_filter_change_reapplies_scene() {
        let mut viewer = viewer_with(RecordingEngine::new());
        viewer.load_initial_basemap().unwrap();
        viewer.set_tag_filter(Some("roads".to_string()));
        let applied = viewer.engine().applied_configs.last().unwrap();
        assert_eq!(applied.tag_filter(), Some("roads"));

        viewer.set_tag_filter(None);
        let applied = viewer.engine().applied_configs.last().unwrap();
        assert_eq!(applied.tag_filter(), None);
    }

    #[test]
    fn tooltip_rows_skip_blank_values() {
        let mut state = UiState::default();
        state.property_path = Some(PropertyPath::key("pop"));

        let feature = Feature::from_json(serde_json::json!({
            "id": "f1", "name": "", "pop": 42
        }));
        let rows = feature_tooltip_rows(&feature, &state);
        assert_eq!(
            rows,
            vec![
                ("id".to_string(), "f1".to_string()),
                ("pop".to_string(), "42".to_string()),
            ]
        );
    }

    #[test]
    fn tooltip_shows_null_for_unresolved_property() {
        let mut state = UiState::default();
        state.property_path = Some(PropertyPath::key("missing"));
        let feature = Feature::from_json(serde_json::json!({ "id": "f1" }));
        let rows = feature_tooltip_rows(&feature, &state);
        assert_eq!(rows[1], ("missing".to_string(), "null".to_string()));
    }
}
