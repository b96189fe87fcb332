//! Write-path helpers for the editing tool: turn a pasted link into the
//! values stored on a record, and build the embed link saved next to them.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::reference::parse_reference;
use crate::units::{clamp_pitch, clamp_stored_fov, normalize_heading, zoom_level_to_fov};
use crate::viewpoint::Viewpoint;

const EMBED_BASE_URL: &str = "https://www.google.com/maps/embed/v1/streetview";

/// Form-encoding set: everything but unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Column values as written back to a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredView {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub heading: Option<f64>,
    pub pitch: Option<f64>,
    /// Field of view in degrees, `10..=100` once sanitized.
    pub field_of_view: Option<f64>,
}

impl StoredView {
    /// Normalizes heading, clamps pitch and clamps field of view to the
    /// stored range. Non-finite values are dropped.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Self {
            latitude: finite(self.latitude),
            longitude: finite(self.longitude),
            heading: finite(self.heading).map(normalize_heading),
            pitch: finite(self.pitch).map(clamp_pitch),
            field_of_view: finite(self.field_of_view).map(clamp_stored_fov),
        }
    }

    /// Stored form of a resolved viewpoint; zoom goes back to degrees.
    #[must_use]
    pub fn from_viewpoint(viewpoint: &Viewpoint) -> Self {
        Self {
            latitude: Some(viewpoint.position.lat),
            longitude: Some(viewpoint.position.lng),
            heading: Some(viewpoint.heading),
            pitch: Some(viewpoint.pitch),
            field_of_view: Some(zoom_level_to_fov(viewpoint.zoom_level)),
        }
        .sanitized()
    }
}

/// Extracts storable values from a pasted link. Missing fields stay `None`.
#[must_use]
pub fn parse_for_storage(raw: &str) -> StoredView {
    let Some(parsed) = parse_reference(raw) else {
        return StoredView::default();
    };
    StoredView {
        latitude: parsed.position.map(|p| p.lat),
        longitude: parsed.position.map(|p| p.lng),
        heading: parsed.heading,
        pitch: parsed.pitch,
        field_of_view: parsed.field_of_view,
    }
    .sanitized()
}

/// Builds the embed link for a stored view.
///
/// Returns `None` without an API key or without both coordinates. Values are
/// sanitized before they are written into the link.
#[must_use]
pub fn build_embed_url(view: &StoredView, api_key: Option<&str>) -> Option<String> {
    let api_key = api_key.filter(|k| !k.trim().is_empty())?;
    let view = view.sanitized();
    let (lat, lng) = (view.latitude?, view.longitude?);

    let mut params: Vec<(&str, String)> = vec![
        ("key", api_key.to_string()),
        ("location", format!("{lat},{lng}")),
    ];
    if let Some(heading) = view.heading {
        params.push(("heading", heading.to_string()));
    }
    if let Some(pitch) = view.pitch {
        params.push(("pitch", pitch.to_string()));
    }
    if let Some(fov) = view.field_of_view {
        params.push(("fov", fov.to_string()));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&");

    Some(format!("{EMBED_BASE_URL}?{query}"))
}
