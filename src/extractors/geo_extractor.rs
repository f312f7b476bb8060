//! Map coordinate extraction
//!
//! Post pages carry coordinates in one of three places, tried in order:
//! - `data-latitude` / `data-longitude` on the map container
//! - `"latitude": ...` pairs inside inline script payloads
//! - `place:location:*` meta tags
//!
//! Values are passed through as the raw strings found in the markup.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::dom::{meta_property, SelectorChain};

/// Coordinates as found on the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub map_accuracy: Option<String>,
}

static MAP_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["#map", "#mapcontainer #map"]));

static LATITUDE_RE: LazyLock<Regex> = LazyLock::new(|| numeric_key_pattern("latitude"));
static LONGITUDE_RE: LazyLock<Regex> = LazyLock::new(|| numeric_key_pattern("longitude"));
static ACCURACY_RE: LazyLock<Regex> = LazyLock::new(|| numeric_key_pattern("accuracy"));

/// `"key": 12.5` or `"key": "12.5"`
fn numeric_key_pattern(key: &str) -> Regex {
    let pattern = format!(
        r#""{}"\s*:\s*(?:"(-?\d+(?:\.\d+)?)"|(-?\d+(?:\.\d+)?))"#,
        regex::escape(key)
    );
    Regex::new(&pattern).expect("coordinate pattern is valid")
}

type CoordinateSource = fn(&Html) -> Option<Coordinates>;

/// Sources in priority order; the first one that succeeds wins
const COORDINATE_SOURCES: [(&str, CoordinateSource); 3] = [
    ("map element", from_map_element),
    ("script payload", from_script_payload),
    ("meta tags", from_meta_tags),
];

/// Extract latitude, longitude and map accuracy from a parsed page.
///
/// Returns all-`None` coordinates when no source matches.
pub fn extract_coordinates(document: &Html) -> Coordinates {
    for (name, source) in COORDINATE_SOURCES {
        if let Some(coords) = source(document) {
            debug!(source = name, "coordinates found");
            return coords;
        }
    }
    Coordinates::default()
}

fn from_map_element(document: &Html) -> Option<Coordinates> {
    let map = MAP_CHAIN.first_in(document)?;
    let attr = |name: &str| {
        map.value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };

    let coords = Coordinates {
        latitude: attr("data-latitude"),
        longitude: attr("data-longitude"),
        map_accuracy: attr("data-accuracy").or_else(|| attr("data-accuracy-meters")),
    };

    // A map container without any position falls through to the next source
    if coords.latitude.is_none() && coords.longitude.is_none() {
        return None;
    }
    Some(coords)
}

fn from_script_payload(document: &Html) -> Option<Coordinates> {
    let selector = Selector::parse("script").ok()?;

    for element in document.select(&selector) {
        let script = element.inner_html();
        if !(script.contains("latitude") && script.contains("longitude")) {
            continue;
        }

        if let (Some(latitude), Some(longitude)) = (
            capture_number(&LATITUDE_RE, &script),
            capture_number(&LONGITUDE_RE, &script),
        ) {
            return Some(Coordinates {
                latitude: Some(latitude),
                longitude: Some(longitude),
                map_accuracy: capture_number(&ACCURACY_RE, &script),
            });
        }
    }

    None
}

fn capture_number(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn from_meta_tags(document: &Html) -> Option<Coordinates> {
    let latitude = meta_property(document, "place:location:latitude")?;
    let longitude = meta_property(document, "place:location:longitude")?;

    Some(Coordinates {
        latitude: Some(latitude),
        longitude: Some(longitude),
        map_accuracy: None,
    })
}
