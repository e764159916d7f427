use crate::properties::{PropertyPath, PropertyValue, lookup};

/// Namespace key under which the space service stores its own metadata on
/// every feature, including the tag list.
pub const XYZ_NAMESPACE: &str = "@ns:com:here:xyz";
pub const TAGS_KEY: &str = "tags";

/// A rendered feature as reported by the tile engine's viewport query.
///
/// Geometry stays with the engine; the viewer only ever reads the property
/// bag, and only for the lifetime of one statistics pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: PropertyValue,
}

impl Feature {
    pub fn new(properties: PropertyValue) -> Self {
        Feature { properties }
    }

    pub fn from_json(properties: serde_json::Value) -> Self {
        Feature {
            properties: PropertyValue::from(properties),
        }
    }

    /// Resolves a property path against this feature's bag.
    pub fn property(&self, path: &PropertyPath) -> Option<&PropertyValue> {
        lookup(&self.properties, path)
    }

    /// The space-service tags attached to this feature, in stored order.
    /// Features without the namespace entry or a tag array report none.
    pub fn tags(&self) -> Vec<&str> {
        let PropertyValue::Object(bag) = &self.properties else {
            return Vec::new();
        };
        let Some(PropertyValue::Object(ns)) = bag.get(XYZ_NAMESPACE) else {
            return Vec::new();
        };
        let Some(PropertyValue::Array(tags)) = ns.get(TAGS_KEY) else {
            return Vec::new();
        };
        tags.iter().filter_map(|t| t.as_str()).collect()
    }
}
