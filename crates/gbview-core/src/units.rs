//! Angle and zoom conversions shared by the resolver and the editing path.
//!
//! The panorama renderer takes a logarithmic zoom level where `0` shows a
//! 180° horizontal field of view and each step halves it. Storage keeps field
//! of view in degrees.

/// Upper bound of the renderer's zoom scale.
pub const MAX_ZOOM_LEVEL: f64 = 5.0;

/// Field of view shown at zoom level `0`.
const FOV_AT_ZOOM_ZERO: f64 = 180.0;

/// Range accepted by the editing tool for the stored field-of-view column.
pub const STORED_FOV_RANGE: (f64, f64) = (10.0, 100.0);

#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Converts a field of view in degrees to a render zoom level in `[0, 5]`.
///
/// Non-finite and non-positive input yields `0`.
#[must_use]
pub fn fov_to_zoom_level(fov_degrees: f64) -> f64 {
    if !fov_degrees.is_finite() || fov_degrees <= 0.0 {
        return 0.0;
    }
    clamp((FOV_AT_ZOOM_ZERO / fov_degrees).log2(), 0.0, MAX_ZOOM_LEVEL)
}

/// Inverse of [`fov_to_zoom_level`] over the clamped zoom range.
#[must_use]
pub fn zoom_level_to_fov(zoom_level: f64) -> f64 {
    let zoom = if zoom_level.is_finite() {
        clamp(zoom_level, 0.0, MAX_ZOOM_LEVEL)
    } else {
        0.0
    };
    FOV_AT_ZOOM_ZERO / zoom.exp2()
}

/// Reduces a compass heading into `[0, 360)`.
#[must_use]
pub fn normalize_heading(heading: f64) -> f64 {
    let h = heading.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if h >= 360.0 {
        0.0
    } else {
        // -0.0 + 0.0 is 0.0
        h + 0.0
    }
}

#[must_use]
pub fn clamp_pitch(pitch: f64) -> f64 {
    clamp(pitch, -90.0, 90.0)
}

/// Tilt runs from `0` (straight down) to `180` (straight up).
#[must_use]
pub fn tilt_to_pitch(tilt: f64) -> f64 {
    tilt - 90.0
}

/// Clamps a field of view to the range the stored column accepts.
#[must_use]
pub fn clamp_stored_fov(fov_degrees: f64) -> f64 {
    clamp(fov_degrees, STORED_FOV_RANGE.0, STORED_FOV_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fov_180_is_zoom_zero() {
        assert!(approx(fov_to_zoom_level(180.0), 0.0));
    }

    #[test]
    fn fov_90_is_zoom_one() {
        assert!(approx(fov_to_zoom_level(90.0), 1.0));
    }

    #[test]
    fn fov_10_is_about_4_17() {
        let z = fov_to_zoom_level(10.0);
        assert!((z - 4.1699).abs() < 1e-3, "got {z}");
    }

    #[test]
    fn tiny_fov_clamps_to_max_zoom() {
        assert!(approx(fov_to_zoom_level(1.0), MAX_ZOOM_LEVEL));
    }

    #[test]
    fn wide_fov_clamps_to_zero() {
        assert!(approx(fov_to_zoom_level(360.0), 0.0));
    }

    #[test]
    fn degenerate_fov_is_zero() {
        assert!(approx(fov_to_zoom_level(0.0), 0.0));
        assert!(approx(fov_to_zoom_level(-20.0), 0.0));
        assert!(approx(fov_to_zoom_level(f64::NAN), 0.0));
        assert!(approx(fov_to_zoom_level(f64::INFINITY), 0.0));
    }

    #[test]
    fn zoom_to_fov_inverts_conversion() {
        for fov in [15.0, 45.0, 75.0, 100.0, 180.0] {
            let back = zoom_level_to_fov(fov_to_zoom_level(fov));
            assert!((back - fov).abs() < 1e-9, "fov {fov} came back as {back}");
        }
        assert!(approx(zoom_level_to_fov(f64::NAN), 180.0));
    }

    #[test]
    fn heading_wraps_into_range() {
        assert!(approx(normalize_heading(0.0), 0.0));
        assert!(approx(normalize_heading(360.0), 0.0));
        assert!(approx(normalize_heading(725.5), 5.5));
        assert!(approx(normalize_heading(-90.0), 270.0));
        assert!(normalize_heading(-1e-20) < 360.0);
    }

    #[test]
    fn negative_zero_heading_is_positive_zero() {
        let h = normalize_heading(-0.0);
        assert!(h.is_sign_positive(), "got {h:?}");
        assert!(normalize_heading(-360.0).is_sign_positive());
    }

    #[test]
    fn pitch_is_clamped() {
        assert!(approx(clamp_pitch(120.0), 90.0));
        assert!(approx(clamp_pitch(-95.0), -90.0));
        assert!(approx(clamp_pitch(12.5), 12.5));
    }

    #[test]
    fn tilt_90_is_level() {
        assert!(approx(tilt_to_pitch(90.0), 0.0));
        assert!(approx(tilt_to_pitch(0.0), -90.0));
        assert!(approx(tilt_to_pitch(180.0), 90.0));
    }

    #[test]
    fn stored_fov_is_clamped() {
        assert!(approx(clamp_stored_fov(5.0), 10.0));
        assert!(approx(clamp_stored_fov(120.0), 100.0));
        assert!(approx(clamp_stored_fov(75.0), 75.0));
    }
}
