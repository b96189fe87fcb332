//! Viewpoint resolution: one canonical camera setup per record.
//!
//! A record can describe its panorama twice: through the reference link and
//! through the explicit columns. The link wins field by field, the columns
//! fill the gaps, and missing orientation defaults to `0`.
//!
//! ## Stored field-of-view column
//!
//! The `zoom` column has held two different units over the years. Values
//! above `5` were entered as field of view in degrees (the editing tool
//! clamps those to `10..=100`); values at or below `5` were entered as an
//! already-converted render zoom level. [`STORED_ZOOM_DEGREES_THRESHOLD`]
//! encodes that split. It is a property of the existing data, not a choice,
//! and has to stay until the column is migrated to a single unit.

use serde::{Deserialize, Serialize};

use crate::record::{LatLng, Record};
use crate::reference::{parse_reference, ParsedReference};
use crate::units::{clamp, clamp_pitch, fov_to_zoom_level, normalize_heading, MAX_ZOOM_LEVEL};

/// Stored `zoom` values strictly above this are field-of-view degrees.
pub const STORED_ZOOM_DEGREES_THRESHOLD: f64 = 5.0;

/// Canonical camera setup for rendering a panorama.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub position: LatLng,
    /// Degrees in `[0, 360)`.
    pub heading: f64,
    /// Degrees in `[-90, 90]`.
    pub pitch: f64,
    /// Render zoom level in `[0, 5]`.
    pub zoom_level: f64,
}

/// Resolves the viewpoint for a record.
///
/// Returns `None` when neither the reference link nor the explicit columns
/// give a finite position; such a record cannot be rendered.
#[must_use]
pub fn resolve(record: &Record) -> Option<Viewpoint> {
    let parsed = parsed_reference(record);
    let position = position_from(parsed.as_ref(), record)?;

    let heading = parsed
        .and_then(|p| p.heading)
        .or_else(|| record.heading.filter(|h| h.is_finite()))
        .unwrap_or(0.0);

    let pitch = parsed
        .and_then(|p| p.pitch)
        .or_else(|| record.pitch.filter(|p| p.is_finite()))
        .unwrap_or(0.0);

    let zoom_level = match parsed.and_then(|p| p.field_of_view) {
        Some(fov) => fov_to_zoom_level(fov),
        None => stored_zoom_level(record.field_of_view),
    };

    Some(Viewpoint {
        position,
        heading: normalize_heading(heading),
        pitch: clamp_pitch(pitch),
        zoom_level,
    })
}

/// Position alone: reference link first, then the explicit columns.
#[must_use]
pub fn record_position(record: &Record) -> Option<LatLng> {
    position_from(parsed_reference(record).as_ref(), record)
}

/// Interprets the stored field-of-view column as a render zoom level.
///
/// Values above [`STORED_ZOOM_DEGREES_THRESHOLD`] are converted from degrees;
/// anything else is taken as a zoom level and clamped to `[0, 5]`. Absent or
/// non-finite values give `0`.
#[must_use]
pub fn stored_zoom_level(stored: Option<f64>) -> f64 {
    match stored.filter(|v| v.is_finite()) {
        Some(v) if v > STORED_ZOOM_DEGREES_THRESHOLD => fov_to_zoom_level(v),
        Some(v) => clamp(v, 0.0, MAX_ZOOM_LEVEL),
        None => 0.0,
    }
}

fn parsed_reference(record: &Record) -> Option<ParsedReference> {
    record.panorama_reference.as_deref().and_then(parse_reference)
}

fn position_from(parsed: Option<&ParsedReference>, record: &Record) -> Option<LatLng> {
    parsed
        .and_then(|p| p.position)
        .or_else(|| record.stored_position())
}
