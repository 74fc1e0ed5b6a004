//! Coordinate matchers, one per URL encoding.
//!
//! Every matcher reads signed decimal degrees of the form `-?\d+\.\d+`;
//! integers or partially numeric text never match. A pair outside the valid
//! degree ranges is a non-match as well.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::GeodeticCoordinate;

/// One strategy for recovering a coordinate from a map URL.
pub trait CoordinateMatcher: Send + Sync {
    /// Stable identifier, used in logs and diagnostics.
    fn name(&self) -> &'static str;

    fn try_match(&self, url: &str) -> Option<GeodeticCoordinate>;
}

static PLACE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").expect("place marker pattern is valid")
});

static VIEWPORT_CENTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").expect("viewport pattern is valid")
});

static OSM_MAP_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#map=\d+/(-?\d+\.\d+)/(-?\d+\.\d+)").expect("osm fragment pattern is valid")
});

static OSM_MARKER_LAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]mlat=(-?\d+\.\d+)").expect("osm mlat pattern is valid")
});

static OSM_MARKER_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]mlon=(-?\d+\.\d+)").expect("osm mlon pattern is valid")
});

/// Google Maps data token `!3d<lat>!4d<lon>`, the exact pin of a place.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceMarkerMatcher;

impl CoordinateMatcher for PlaceMarkerMatcher {
    fn name(&self) -> &'static str {
        "google_place_marker"
    }

    fn try_match(&self, url: &str) -> Option<GeodeticCoordinate> {
        capture_pair(&PLACE_MARKER, url)
    }
}

/// Google Maps `@<lat>,<lon>` viewport center.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewportCenterMatcher;

impl CoordinateMatcher for ViewportCenterMatcher {
    fn name(&self) -> &'static str {
        "google_viewport_center"
    }

    fn try_match(&self, url: &str) -> Option<GeodeticCoordinate> {
        capture_pair(&VIEWPORT_CENTER, url)
    }
}

/// OpenStreetMap `#map=<zoom>/<lat>/<lon>` fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsmMapFragmentMatcher;

impl CoordinateMatcher for OsmMapFragmentMatcher {
    fn name(&self) -> &'static str {
        "osm_map_fragment"
    }

    fn try_match(&self, url: &str) -> Option<GeodeticCoordinate> {
        capture_pair(&OSM_MAP_FRAGMENT, url)
    }
}

/// OpenStreetMap `mlat=`/`mlon=` marker parameters. Both must be present.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsmMarkerParamsMatcher;

impl CoordinateMatcher for OsmMarkerParamsMatcher {
    fn name(&self) -> &'static str {
        "osm_marker_params"
    }

    fn try_match(&self, url: &str) -> Option<GeodeticCoordinate> {
        let lat = capture_number(&OSM_MARKER_LAT, url)?;
        let lon = capture_number(&OSM_MARKER_LON, url)?;
        GeodeticCoordinate::new(lat, lon).ok()
    }
}

/// Matchers in priority order: precise pins before viewport centers,
/// Google encodings before OpenStreetMap ones.
pub fn default_matchers() -> Vec<Box<dyn CoordinateMatcher>> {
    vec![
        Box::new(PlaceMarkerMatcher),
        Box::new(ViewportCenterMatcher),
        Box::new(OsmMapFragmentMatcher),
        Box::new(OsmMarkerParamsMatcher),
    ]
}

fn capture_pair(pattern: &Regex, url: &str) -> Option<GeodeticCoordinate> {
    let captures = pattern.captures(url)?;
    let lat = captures.get(1)?.as_str().parse().ok()?;
    let lon = captures.get(2)?.as_str().parse().ok()?;
    GeodeticCoordinate::new(lat, lon).ok()
}

fn capture_number(pattern: &Regex, url: &str) -> Option<f64> {
    pattern.captures(url)?.get(1)?.as_str().parse().ok()
}
