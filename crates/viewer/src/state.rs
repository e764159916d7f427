//! Flat UI state store.
//!
//! Everything the UI displays or the user can change lives here; the
//! orchestrator reads it when applying state to the scene and writes the
//! statistics results back into it.

use std::collections::{BTreeMap, BTreeSet};

use compute::ViewportSummary;
use scene::{PropertyPath, format_path};

/// A display toggle's current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToggleValue {
    Flag(bool),
    Number(f64),
}

impl ToggleValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ToggleValue::Flag(b) => Some(*b),
            ToggleValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ToggleValue::Number(n) => Some(*n),
            ToggleValue::Flag(_) => None,
        }
    }
}

/// Space metadata block shown in the side panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpacePanel {
    pub title: String,
    pub description: String,
    pub feature_count: String,
    pub data_size: String,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub basemap: String,
    pub space_id: Option<String>,
    pub access_token: Option<String>,
    /// The property the statistics panel summarizes; `None` when nothing
    /// is selected.
    pub property_path: Option<PropertyPath>,
    pub toggles: BTreeMap<String, ToggleValue>,
    /// Comma-separated tag filter applied to the tile source.
    pub tag_filter: Option<String>,
    pub space: Option<SpacePanel>,
    /// Latest reduction over the settled viewport.
    pub viewport: ViewportSummary,
    /// Every tag seen so far: the statistics seed list merged with each
    /// settled viewport's tags.
    pub unique_tags: BTreeSet<String>,
}

impl UiState {
    pub fn toggle(&self, name: &str) -> Option<ToggleValue> {
        self.toggles.get(name).copied()
    }

    pub fn set_toggle(&mut self, name: impl Into<String>, value: ToggleValue) {
        self.toggles.insert(name.into(), value);
    }

    pub fn seed_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !tag.is_empty() {
                self.unique_tags.insert(tag);
            }
        }
    }

    /// The shareable subset of the state as an ordered query string.
    /// Values are percent-encoded just enough for the characters these
    /// fields can contain (spaces, commas, brackets).
    pub fn query_params(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(space) = &self.space_id {
            pairs.push(("space", space.clone()));
        }
        if let Some(token) = &self.access_token {
            pairs.push(("token", token.clone()));
        }
        if !self.basemap.is_empty() {
            pairs.push(("basemap", self.basemap.clone()));
        }
        if let Some(path) = &self.property_path {
            if !path.is_empty() {
                pairs.push(("property", format_path(path)));
            }
        }
        if let Some(tags) = &self.tag_filter {
            if !tags.is_empty() {
                pairs.push(("tags", tags.clone()));
            }
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Seeds the state from query-string pairs, the inverse of
    /// [`UiState::query_params`]. Unknown keys are ignored.
    pub fn set_from_query<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in pairs {
            let value = decode_component(value);
            match key {
                "space" => self.space_id = Some(value),
                "token" => self.access_token = Some(value),
                "basemap" => self.basemap = value,
                "property" => {
                    let path = PropertyPath::parse(&value);
                    self.property_path = (!path.is_empty()).then_some(path);
                }
                "tags" => self.tag_filter = (!value.is_empty()).then_some(value),
                _ => {}
            }
        }
    }
}

fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 3 <= bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(b) = u8::from_str_radix(&value[i + 1..i + 3], 16) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_params_round_trip() {
        let mut state = UiState::default();
        state.space_id = Some("abc123".to_string());
        state.access_token = Some("tok".to_string());
        state.basemap = "refill-dark".to_string();
        state.property_path = Some(PropertyPath::parse("details.pop[0]"));
        state.tag_filter = Some("roads,bridges".to_string());

        let query = state.query_params();
        assert_eq!(
            query,
            "space=abc123&token=tok&basemap=refill-dark&property=details.pop%5B0%5D&tags=roads%2Cbridges"
        );

        let mut restored = UiState::default();
        let pairs: Vec<(&str, &str)> = query
            .split('&')
            .map(|p| p.split_once('=').unwrap())
            .collect();
        restored.set_from_query(pairs);
        assert_eq!(restored.space_id, state.space_id);
        assert_eq!(restored.basemap, state.basemap);
        assert_eq!(restored.property_path, state.property_path);
        assert_eq!(restored.tag_filter, state.tag_filter);
    }

    #[test]
    fn empty_state_has_empty_query() {
        let state = UiState::default();
        assert_eq!(state.query_params(), "");
    }

    #[test]
    fn unknown_query_keys_are_ignored() {
        let mut state = UiState::default();
        state.set_from_query([("bogus", "1"), ("space", "s1")]);
        assert_eq!(state.space_id.as_deref(), Some("s1"));
    }

    #[test]
    fn seed_tags_merges_and_drops_blanks() {
        let mut state = UiState::default();
        state.seed_tags(["roads", "", "parks"]);
        state.seed_tags(["roads", "water"]);
        let tags: Vec<&str> = state.unique_tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["parks", "roads", "water"]);
    }

    #[test]
    fn toggles_store_flags_and_numbers() {
        let mut state = UiState::default();
        state.set_toggle("buildings", ToggleValue::Flag(false));
        state.set_toggle("points", ToggleValue::Number(6.0));
        assert_eq!(state.toggle("buildings").unwrap().as_flag(), Some(false));
        assert_eq!(state.toggle("points").unwrap().as_number(), Some(6.0));
        assert_eq!(state.toggle("points").unwrap().as_flag(), None);
        assert!(state.toggle("missing").is_none());
    }
}
