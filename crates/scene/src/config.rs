//! The owned scene-configuration tree.
//!
//! The rendering engine consumes this declaratively; the viewer owns one
//! instance and mutates it through the methods here. Mutations have no
//! visible effect until the engine is explicitly asked to re-apply the
//! config — that step is the orchestrator's responsibility, not this type's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved data source carrying the remote space's vector tiles.
pub const SPACE_SOURCE: &str = "_xyzspace";
/// Overlay layers bound to the space source.
pub const DOTS_LAYER: &str = "_xyz_dots";
pub const LINES_LAYER: &str = "_xyz_lines";
pub const POLYGONS_LAYER: &str = "_xyz_polygons";

/// Source name the basemap bundles bind their own layers to.
pub const BASEMAP_SOURCE: &str = "basemap";
/// Basemap layers the UI exposes visibility switches for.
pub const BUILDINGS_LAYER: &str = "buildings";
pub const ROADS_LAYER: &str = "roads";
pub const LABELS_LAYER: &str = "labels";

pub const ACCESS_TOKEN_PARAM: &str = "access_token";
pub const TAGS_PARAM: &str = "tags";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Style bundles layered in order; later entries override earlier ones.
    pub imports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<[f64; 3]>,
    pub sources: BTreeMap<String, SourceConfig>,
    pub layers: BTreeMap<String, LayerConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub url_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub source: String,
    pub visible: bool,
    #[serde(default)]
    pub draw: DrawStyle,
}

impl LayerConfig {
    pub fn for_source(source: impl Into<String>) -> Self {
        LayerConfig {
            source: source.into(),
            visible: true,
            draw: DrawStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_size_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width_px: Option<f64>,
}

impl SceneConfig {
    /// Points the reserved space source at a tile URL template and merges
    /// the access token into its query parameters, preserving whatever
    /// parameters are already present. Creates the source if a basemap
    /// bundle did not declare it.
    pub fn set_space_source(&mut self, tile_url: impl Into<String>, access_token: &str) {
        let source = self.sources.entry(SPACE_SOURCE.to_string()).or_default();
        source.url = tile_url.into();
        source
            .url_params
            .insert(ACCESS_TOKEN_PARAM.to_string(), access_token.to_string());
    }

    /// Sets or clears the tag-filter query parameter on the space source.
    /// Clearing when the source was never configured is a no-op, not a
    /// fault.
    pub fn set_tag_filter(&mut self, tags: Option<&str>) {
        let Some(source) = self.sources.get_mut(SPACE_SOURCE) else {
            return;
        };
        match tags {
            Some(t) if !t.is_empty() => {
                source
                    .url_params
                    .insert(TAGS_PARAM.to_string(), t.to_string());
            }
            _ => {
                source.url_params.remove(TAGS_PARAM);
            }
        }
    }

    pub fn tag_filter(&self) -> Option<&str> {
        self.sources
            .get(SPACE_SOURCE)?
            .url_params
            .get(TAGS_PARAM)
            .map(String::as_str)
    }

    /// Visibility toggle; unknown layers are ignored (a basemap may not
    /// declare every layer the UI has a switch for).
    pub fn set_layer_visible(&mut self, layer: &str, visible: bool) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.visible = visible;
        }
    }

    pub fn set_point_size(&mut self, layer: &str, px: f64) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.draw.point_size_px = Some(px);
        }
    }

    pub fn set_layer_color(&mut self, layer: &str, color: [f64; 4]) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.draw.color = Some(color);
        }
    }

    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.get(name)
    }
}
