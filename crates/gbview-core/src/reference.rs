//! Panorama reference-link parsing.
//!
//! Reference links come in two shapes, often mixed in the same string:
//!
//! - **Query style** (embed and API links):
//!   `…/streetview?viewpoint=48.2,16.37&heading=120&pitch=5&fov=80`
//! - **Path style** (share links copied from the map site):
//!   `…/maps/@48.2,16.37,3a,75y,268h,90t/data=…`
//!
//! Both shapes are inspected. Query values win; the path only fills fields
//! the query left empty. Heading and pitch aliases are tried until one holds
//! a number; for position and field of view the first non-empty alias is
//! the only one read. Nothing here fails: unusable input just yields
//! fewer fields, and a link that yields none parses to `None`.

use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::LatLng;
use crate::units::tilt_to_pitch;

const POSITION_KEYS: [&str; 2] = ["viewpoint", "cbll"];
const HEADING_KEYS: [&str; 3] = ["heading", "yaw", "y"];
const PITCH_KEYS: [&str; 2] = ["pitch", "p"];
const FOV_KEYS: [&str; 2] = ["fov", "f"];

/// First `@lat,lng` in the path plus the remainder of that path segment.
static PATH_VIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([-0-9.]+),([-0-9.]+)([^/]*)").expect("valid regex")
});

/// Raw fields extracted from a reference link. Values are not normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReference {
    pub position: Option<LatLng>,
    pub heading: Option<f64>,
    pub pitch: Option<f64>,
    pub field_of_view: Option<f64>,
}

impl ParsedReference {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.heading.is_none()
            && self.pitch.is_none()
            && self.field_of_view.is_none()
    }

    /// Fills every field still empty in `self` from `other`.
    fn fill_from(&mut self, other: ParsedReference) {
        self.position = self.position.or(other.position);
        self.heading = self.heading.or(other.heading);
        self.pitch = self.pitch.or(other.pitch);
        self.field_of_view = self.field_of_view.or(other.field_of_view);
    }
}

/// Parses a panorama reference link.
///
/// Returns `None` when neither the query string nor the path yields a single
/// usable field.
#[must_use]
pub fn parse_reference(reference: &str) -> Option<ParsedReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let (path, query) = split_path_and_query(reference);

    let mut parsed = query.map(parse_query).unwrap_or_default();
    if let Some(from_path) = parse_path(path) {
        parsed.fill_from(from_path);
    }

    (!parsed.is_empty()).then_some(parsed)
}

/// Splits a link into its path (authority stripped) and raw query string.
fn split_path_and_query(reference: &str) -> (&str, Option<&str>) {
    let without_fragment = reference.split('#').next().unwrap_or_default();
    let (before_query, query) = match without_fragment.split_once('?') {
        Some((before, query)) => (before, Some(query)),
        None => (without_fragment, None),
    };

    let path = match before_query.find("://") {
        Some(idx) => {
            let rest = &before_query[idx + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => before_query,
    };

    (path, query)
}

type QueryPair<'a> = (Cow<'a, str>, Cow<'a, str>);

fn parse_query(query: &str) -> ParsedReference {
    let pairs: Vec<QueryPair<'_>> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect();

    ParsedReference {
        position: first_present(&pairs, &POSITION_KEYS).and_then(parse_lat_lng),
        heading: first_number(&pairs, &HEADING_KEYS),
        pitch: first_number(&pairs, &PITCH_KEYS),
        field_of_view: first_present(&pairs, &FOV_KEYS).and_then(parse_finite),
    }
}

/// Value of the first occurrence of `key`, like `URLSearchParams.get`.
fn query_value<'p>(pairs: &'p [QueryPair<'_>], key: &str) -> Option<&'p str> {
    pairs
        .iter()
        .find(|(k, _)| k.as_ref() == key)
        .map(|(_, v)| v.as_ref())
}

/// Value of the first alias, in priority order, that is present and
/// non-empty. An unusable value still shadows the aliases after it.
fn first_present<'p>(pairs: &'p [QueryPair<'_>], keys: &[&str]) -> Option<&'p str> {
    keys.iter()
        .find_map(|&key| query_value(pairs, key).filter(|v| !v.is_empty()))
}

/// First alias, in priority order, whose value is a finite number.
fn first_number(pairs: &[QueryPair<'_>], keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|&key| query_value(pairs, key).and_then(parse_finite))
}

fn parse_path(path: &str) -> Option<ParsedReference> {
    let caps = PATH_VIEW_RE.captures(path)?;

    let position = match (
        caps.get(1).and_then(|m| parse_finite(m.as_str())),
        caps.get(2).and_then(|m| parse_finite(m.as_str())),
    ) {
        (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
        _ => None,
    };

    let mut parsed = ParsedReference {
        position,
        ..ParsedReference::default()
    };
    let mut tilt = None;

    let tokens = caps.get(3).map_or("", |m| m.as_str());
    for token in tokens.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some((number, unit)) = split_unit_suffix(token) else {
            continue;
        };
        let Some(value) = parse_finite(number) else {
            continue;
        };
        match unit {
            'y' => {
                parsed.field_of_view.get_or_insert(value);
            }
            'h' => {
                parsed.heading.get_or_insert(value);
            }
            't' => {
                tilt.get_or_insert(value);
            }
            'p' => {
                parsed.pitch.get_or_insert(value);
            }
            _ => {}
        }
    }

    // A direct pitch beats one derived from tilt.
    if parsed.pitch.is_none() {
        parsed.pitch = tilt.map(tilt_to_pitch);
    }

    Some(parsed)
}

/// Splits `"75y"` into `("75", 'y')`, lowercasing the unit letter.
fn split_unit_suffix(token: &str) -> Option<(&str, char)> {
    let unit = token.chars().last()?;
    if !unit.is_ascii_alphabetic() {
        return None;
    }
    let number = &token[..token.len() - unit.len_utf8()];
    Some((number, unit.to_ascii_lowercase()))
}

fn parse_lat_lng(raw: &str) -> Option<LatLng> {
    let mut parts = raw.split(',');
    let lat = parse_finite(parts.next()?)?;
    let lng = parse_finite(parts.next()?)?;
    LatLng::new_finite(lat, lng)
}

/// Parses a decimal number, treating blanks and non-finite values as absent.
fn parse_finite(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode_str(raw).decode_utf8_lossy()
    }
}

#[cfg(test)]
#[path = "reference_test.rs"]
mod tests;
