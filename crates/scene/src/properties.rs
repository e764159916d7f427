//! Feature property model and path utilities.
//!
//! Feature properties arrive from the tile engine as untyped, arbitrarily
//! nested JSON. This module gives them a closed variant type and the lookup,
//! formatting, and number-coercion helpers the rest of the viewer builds on.

use std::collections::BTreeMap;
use std::fmt;

/// A value inside a feature's property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropertyValue>),
    Object(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(b),
            // Numbers outside f64 range degrade to null rather than lying.
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => PropertyValue::Number(f),
                None => PropertyValue::Null,
            },
            serde_json::Value::String(s) => PropertyValue::String(s),
            serde_json::Value::Array(items) => {
                PropertyValue::Array(items.into_iter().map(PropertyValue::from).collect())
            }
            serde_json::Value::Object(map) => PropertyValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::String(s) => write!(f, "{s}"),
            PropertyValue::Array(items) => write!(f, "[{} items]", items.len()),
            PropertyValue::Object(map) => write!(f, "{{{} keys}}", map.len()),
        }
    }
}

/// One step of a property path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// An ordered path into a nested property bag, e.g. `details.pop[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyPath {
    pub segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        PropertyPath { segments }
    }

    pub fn key(name: impl Into<String>) -> Self {
        PropertyPath {
            segments: vec![PathSegment::Key(name.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push_key(&mut self, name: impl Into<String>) {
        self.segments.push(PathSegment::Key(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Parses dotted/bracketed display notation, e.g. `a.b[2].c`.
    ///
    /// The inverse of [`format_path`] for paths whose keys contain no dots
    /// or brackets. An empty string yields an empty path.
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut in_bracket = false;

        for ch in text.chars() {
            match ch {
                '.' if !in_bracket => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current)));
                    }
                }
                '[' if !in_bracket => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current)));
                    }
                    in_bracket = true;
                }
                ']' if in_bracket => {
                    in_bracket = false;
                    let seg = match current.parse::<usize>() {
                        Ok(i) => PathSegment::Index(i),
                        Err(_) => PathSegment::Key(std::mem::take(&mut current)),
                    };
                    current.clear();
                    segments.push(seg);
                }
                _ => current.push(ch),
            }
        }
        if !current.is_empty() {
            segments.push(PathSegment::Key(current));
        }

        PropertyPath { segments }
    }
}

impl FromIterator<PathSegment> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        PropertyPath {
            segments: iter.into_iter().collect(),
        }
    }
}

/// Resolves `path` inside `properties`, returning `None` the moment any
/// segment fails: missing key, out-of-range index, a non-container
/// intermediate, or an explicit null intermediate. Never panics.
pub fn lookup<'a>(properties: &'a PropertyValue, path: &PropertyPath) -> Option<&'a PropertyValue> {
    let mut current = properties;
    for segment in &path.segments {
        current = match (current, segment) {
            (PropertyValue::Object(map), PathSegment::Key(key)) => map.get(key)?,
            (PropertyValue::Array(items), PathSegment::Index(i)) => items.get(*i)?,
            // Arrays also answer numeric-looking keys, as the engine reports
            // index segments as strings in some payloads.
            (PropertyValue::Array(items), PathSegment::Key(key)) => {
                items.get(key.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Renders a path with dot notation for keys and bracket notation for
/// indices. Keys that read as integers render in brackets too, so a path
/// recorded through string keys displays the same as one through indices.
pub fn format_path(path: &PropertyPath) -> String {
    let mut out = String::new();
    for (i, segment) in path.segments.iter().enumerate() {
        match segment {
            PathSegment::Index(n) => {
                out.push_str(&format!("[{n}]"));
            }
            PathSegment::Key(k) if k.parse::<i64>().is_ok() => {
                out.push_str(&format!("[{k}]"));
            }
            PathSegment::Key(k) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(k);
            }
        }
    }
    out
}

/// Best-effort numeric coercion.
///
/// Numbers pass through (`None` for NaN). Strings are scanned for the first
/// run shaped like an optional sign, digit groups optionally separated by
/// commas, and an optional decimal part; thousands separators are stripped
/// before parsing, so `"$1,500.25"` coerces to `1500.25`. US-style grouping
/// only. Booleans, nulls, arrays, and objects never coerce.
pub fn coerce_number(value: &PropertyValue) -> Option<f64> {
    match value {
        PropertyValue::Number(n) => {
            if n.is_nan() {
                None
            } else {
                Some(*n)
            }
        }
        PropertyValue::String(s) => scan_number(s),
        _ => None,
    }
}

fn scan_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();

    // Find the first position where a numeric run can start.
    let mut start = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            // Back up over an immediately preceding sign or decimal point.
            let mut s = i;
            if s > 0 && bytes[s - 1] == b'.' {
                s -= 1;
            }
            if s > 0 && (bytes[s - 1] == b'-' || bytes[s - 1] == b'+') {
                s -= 1;
            }
            start = Some(s);
            break;
        }
    }
    let start = start?;

    // Consume sign, digits, grouping commas, and at most one decimal point.
    let mut run = String::new();
    let mut seen_dot = false;
    for &b in &bytes[start..] {
        match b {
            b'-' | b'+' if run.is_empty() => run.push(b as char),
            b'0'..=b'9' => run.push(b as char),
            b',' if !seen_dot => {} // thousands separator, drop it
            b'.' if !seen_dot => {
                seen_dot = true;
                run.push('.');
            }
            _ => break,
        }
    }

    let parsed: f64 = run.parse().ok()?;
    if parsed.is_nan() { None } else { Some(parsed) }
}

/// Whether at least `threshold_pct` percent of `values` coerce to finite
/// numbers. An empty slice is never "mostly numeric".
pub fn mostly_numeric(values: &[PropertyValue], threshold_pct: f64) -> bool {
    if values.is_empty() {
        return false;
    }
    let numeric = values
        .iter()
        .filter_map(coerce_number)
        .filter(|n| n.is_finite())
        .count();
    numeric as f64 / values.len() as f64 >= threshold_pct / 100.0
}

/// One row of a flattened property bag, for the property-browser UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow {
    /// Nesting depth; top-level leaves sit at level 0.
    pub level: i32,
    pub path: PropertyPath,
    pub display: String,
    /// `None` for container header rows, `Some` for leaves.
    pub value: Option<PropertyValue>,
}

/// Flattens a nested property bag into display rows: a header row per nested
/// container, a value row per leaf, in traversal order.
pub fn flatten_rows(properties: &PropertyValue) -> Vec<PropertyRow> {
    let mut rows = Vec::new();
    flatten_into(properties, -1, false, &PropertyPath::default(), &mut rows);
    rows
}

fn flatten_into(
    value: &PropertyValue,
    level: i32,
    named: bool,
    path: &PropertyPath,
    rows: &mut Vec<PropertyRow>,
) {
    match value {
        PropertyValue::Array(items) => {
            if named {
                rows.push(PropertyRow {
                    level,
                    path: path.clone(),
                    display: format_path(path),
                    value: None,
                });
            }
            for (i, item) in items.iter().enumerate() {
                let mut child = path.clone();
                child.push_index(i);
                flatten_into(item, level + 1, true, &child, rows);
            }
        }
        PropertyValue::Object(map) => {
            if named {
                rows.push(PropertyRow {
                    level,
                    path: path.clone(),
                    display: format_path(path),
                    value: None,
                });
            }
            for (key, item) in map {
                let mut child = path.clone();
                child.push_key(key.clone());
                flatten_into(item, level + 1, true, &child, rows);
            }
        }
        leaf => rows.push(PropertyRow {
            level,
            path: path.clone(),
            display: format_path(path),
            value: Some(leaf.clone()),
        }),
    }
}
