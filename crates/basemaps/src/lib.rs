//! Static registry of cartographic basemaps.
//!
//! Each entry layers a list of remote style bundles (later entries override
//! earlier ones on key conflict) and optionally overrides overlay colors or
//! the scene background. Descriptors are immutable; selecting a basemap
//! builds a fresh `SceneConfig` rather than patching the live one.

use scene::{
    BASEMAP_SOURCE, BUILDINGS_LAYER, DOTS_LAYER, LABELS_LAYER, LINES_LAYER, LayerConfig,
    POLYGONS_LAYER, ROADS_LAYER, SPACE_SOURCE, SceneConfig, SourceConfig,
};

/// Shared overlay style bundle, layered on top of every basemap.
const OVERLAY_BUNDLE: &str = "https://s3.amazonaws.com/xyz-demo/data/demo.yaml";
/// Scene scaffold wiring the space source and overlay layers, without any
/// basemap imports of its own.
const SPACE_SCAFFOLD: &str = "xyz_scene_no_import.yaml";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOverride {
    pub layer: &'static str,
    pub color: [f64; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasemapDescriptor {
    pub name: &'static str,
    /// Style bundles in layering order.
    pub imports: &'static [&'static str],
    pub layer_overrides: &'static [LayerOverride],
    pub background: Option<[f64; 3]>,
}

const RED_LINES: LayerOverride = LayerOverride {
    layer: LINES_LAYER,
    color: [1.0, 0.0, 0.0, 0.5],
};
const BLUE_DOTS: LayerOverride = LayerOverride {
    layer: DOTS_LAYER,
    color: [0.0, 0.0, 1.0, 0.5],
};

/// Declared order is presentation order: `default_name` is the first entry
/// and `next_name` cycles through it.
pub const BASEMAPS: &[BasemapDescriptor] = &[
    BasemapDescriptor {
        name: "dots",
        imports: &[
            "https://raw.githubusercontent.com/sensescape/xyz-dots/master/scene.yaml",
            OVERLAY_BUNDLE,
            SPACE_SCAFFOLD,
        ],
        layer_overrides: &[RED_LINES, BLUE_DOTS],
        background: None,
    },
    BasemapDescriptor {
        name: "pixel",
        imports: &[
            "https://raw.githubusercontent.com/sensescape/xyz-pixel/master/scene.yaml",
            OVERLAY_BUNDLE,
            SPACE_SCAFFOLD,
        ],
        layer_overrides: &[RED_LINES, BLUE_DOTS],
        background: None,
    },
    BasemapDescriptor {
        name: "walkabout",
        imports: &[
            "https://www.nextzen.org/carto/walkabout-style/walkabout-style.zip",
            OVERLAY_BUNDLE,
            SPACE_SCAFFOLD,
        ],
        layer_overrides: &[],
        background: None,
    },
    BasemapDescriptor {
        name: "refill",
        imports: &[
            "https://www.nextzen.org/carto/refill-style/refill-style.zip",
            "https://www.nextzen.org/carto/refill-style/themes/label-4.zip",
            "https://www.nextzen.org/carto/refill-style/themes/terrain-shading-dark.zip",
            OVERLAY_BUNDLE,
            SPACE_SCAFFOLD,
        ],
        layer_overrides: &[],
        background: None,
    },
    BasemapDescriptor {
        name: "refill-dark",
        imports: &[
            "https://www.nextzen.org/carto/refill-style/refill-style.zip",
            "https://www.nextzen.org/carto/refill-style/themes/color-gray-gold.zip",
            "https://www.nextzen.org/carto/refill-style/themes/label-4.zip",
            OVERLAY_BUNDLE,
            SPACE_SCAFFOLD,
        ],
        layer_overrides: &[RED_LINES, BLUE_DOTS],
        background: None,
    },
    BasemapDescriptor {
        name: "none",
        imports: &[OVERLAY_BUNDLE, SPACE_SCAFFOLD],
        layer_overrides: &[],
        background: Some([0.0, 0.0, 0.0]),
    },
];

/// Basemap selector: by registered name, or by position in declared order
/// for callers still holding a legacy numeric index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasemapRef<'a> {
    ByName(&'a str),
    ByLegacyIndex(usize),
}

/// Returns the matching descriptor, or `None` for an unknown name or an
/// out-of-range legacy index.
pub fn resolve(selector: BasemapRef<'_>) -> Option<&'static BasemapDescriptor> {
    match selector {
        BasemapRef::ByName(name) => BASEMAPS.iter().find(|b| b.name == name),
        BasemapRef::ByLegacyIndex(i) => BASEMAPS.get(i),
    }
}

pub fn default_name() -> &'static str {
    BASEMAPS[0].name
}

/// The entry after `current` in declared order, wrapping to the first.
/// An unknown name falls back to the first entry rather than erroring.
pub fn next_name(current: &str) -> &'static str {
    match BASEMAPS.iter().position(|b| b.name == current) {
        Some(i) => BASEMAPS[(i + 1) % BASEMAPS.len()].name,
        None => BASEMAPS[0].name,
    }
}

impl BasemapDescriptor {
    /// Builds a fresh scene configuration for this basemap: imports in
    /// layering order, the reserved space source, and the three overlay
    /// layers with any per-basemap color overrides applied.
    pub fn build_scene(&self) -> SceneConfig {
        let mut config = SceneConfig {
            imports: self.imports.iter().map(|s| s.to_string()).collect(),
            background: self.background,
            ..SceneConfig::default()
        };

        config
            .sources
            .insert(SPACE_SOURCE.to_string(), SourceConfig::default());
        for layer in [DOTS_LAYER, LINES_LAYER, POLYGONS_LAYER] {
            config
                .layers
                .insert(layer.to_string(), LayerConfig::for_source(SPACE_SOURCE));
        }
        for layer in [BUILDINGS_LAYER, ROADS_LAYER, LABELS_LAYER] {
            config
                .layers
                .insert(layer.to_string(), LayerConfig::for_source(BASEMAP_SOURCE));
        }

        for o in self.layer_overrides {
            config.set_layer_color(o.layer, o.color);
        }
        config
    }
}
