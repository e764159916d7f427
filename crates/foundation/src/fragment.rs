use crate::geo::MapView;

/// Parses a `#zoom/lat/lng` URL fragment into a start view.
///
/// The fragment must have exactly three slash-separated numeric components.
/// Anything else (missing fragment, wrong arity, non-numeric parts) yields
/// `None`; a malformed fragment is ignored, never an error.
pub fn parse_view_fragment(fragment: &str) -> Option<MapView> {
    let trimmed = fragment.strip_prefix('#').unwrap_or(fragment);
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let zoom: f64 = parts[0].parse().ok()?;
    let lat: f64 = parts[1].parse().ok()?;
    let lng: f64 = parts[2].parse().ok()?;
    if !zoom.is_finite() || !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    Some(MapView::new(lat, lng, zoom))
}

#[cfg(test)]
mod tests {
    use super::parse_view_fragment;

    #[test]
    fn well_formed_fragment_parses() {
        let view = parse_view_fragment("#5/50.5/-122.25").unwrap();
        assert_eq!(view.zoom, 5.0);
        assert_eq!(view.lat, 50.5);
        assert_eq!(view.lng, -122.25);
    }

    #[test]
    fn prefix_is_optional() {
        assert!(parse_view_fragment("2/37.7/-122.4").is_some());
    }

    #[test]
    fn malformed_fragments_are_ignored() {
        assert!(parse_view_fragment("").is_none());
        assert!(parse_view_fragment("#").is_none());
        assert!(parse_view_fragment("#5/50.5").is_none());
        assert!(parse_view_fragment("#5/50.5/abc").is_none());
        assert!(parse_view_fragment("#5/50.5/-122.25/extra").is_none());
        assert!(parse_view_fragment("#NaN/0/0").is_none());
    }
}
