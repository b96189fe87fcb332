//! Zoom correction for panoramas rendered into a pane smaller than the window.
//!
//! The renderer's vertical field of view is fixed in angle, so the same zoom
//! level looks tighter in a short pane than full-screen. Subtracting
//! `log2(full_height / pane_height)` keeps the framing the viewer would have
//! seen full-screen.

use serde::{Deserialize, Serialize};

use crate::units::{clamp, MAX_ZOOM_LEVEL};

/// Measured heights of the render pane and of the full display, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneDimensions {
    pub pane_height_px: f64,
    pub full_height_px: f64,
}

impl PaneDimensions {
    #[must_use]
    pub fn new(pane_height_px: f64, full_height_px: f64) -> Self {
        Self {
            pane_height_px,
            full_height_px,
        }
    }
}

/// Corrects `desired_zoom_level` for a pane of `pane_height_px` inside a
/// display of `full_height_px`.
///
/// Heights below one pixel (including zero and NaN) count as one pixel. A
/// non-finite desired level counts as `0`. The result is clamped to `[0, 5]`.
#[must_use]
pub fn correct_zoom(desired_zoom_level: f64, pane_height_px: f64, full_height_px: f64) -> f64 {
    let pane = at_least_one_px(pane_height_px);
    let full = at_least_one_px(full_height_px);
    let desired = if desired_zoom_level.is_finite() {
        desired_zoom_level
    } else {
        0.0
    };
    let correction = (full / pane).log2();
    clamp(desired - correction, 0.0, MAX_ZOOM_LEVEL)
}

fn at_least_one_px(height: f64) -> f64 {
    if height.is_finite() {
        height.max(1.0)
    } else {
        1.0
    }
}

/// Zoom framing for one pane across a show/settle cycle.
///
/// A pane that has just been made visible often reports a stale or zero
/// height. [`PaneFraming::show`] gives the value to apply right away, and
/// the next [`PaneFraming::layout_settled`] recomputes it once from the
/// settled size. Later layout events are ignored until the next `show`.
#[derive(Debug, Clone, Default)]
pub struct PaneFraming {
    base_zoom_level: f64,
    awaiting_settle: bool,
}

impl PaneFraming {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the viewpoint's base zoom and returns the corrected level
    /// for the current (possibly transient) dimensions.
    pub fn show(&mut self, base_zoom_level: f64, dims: PaneDimensions) -> f64 {
        self.base_zoom_level = base_zoom_level;
        self.awaiting_settle = true;
        correct_zoom(base_zoom_level, dims.pane_height_px, dims.full_height_px)
    }

    /// Returns the corrected level to re-apply after the layout settled, or
    /// `None` if it was already re-applied since the last `show`.
    pub fn layout_settled(&mut self, dims: PaneDimensions) -> Option<f64> {
        if !self.awaiting_settle {
            return None;
        }
        self.awaiting_settle = false;
        Some(correct_zoom(
            self.base_zoom_level,
            dims.pane_height_px,
            dims.full_height_px,
        ))
    }

    #[must_use]
    pub fn awaiting_settle(&self) -> bool {
        self.awaiting_settle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_height_pane_drops_two_levels() {
        assert!((correct_zoom(3.0, 300.0, 1200.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn full_screen_pane_is_unchanged() {
        assert!((correct_zoom(2.5, 900.0, 900.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn correction_is_clamped_at_zero() {
        assert_eq!(correct_zoom(1.0, 100.0, 1600.0), 0.0);
    }

    #[test]
    fn pane_taller_than_window_zooms_in_up_to_max() {
        assert!((correct_zoom(4.0, 800.0, 400.0) - 5.0).abs() < 1e-9);
        assert!((correct_zoom(3.0, 800.0, 400.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_heights_are_finite() {
        let z = correct_zoom(3.0, 0.0, 0.0);
        assert!((z - 3.0).abs() < 1e-9);
        let z = correct_zoom(3.0, 0.0, 1024.0);
        assert!(z.is_finite());
        assert_eq!(z, 0.0);
        assert!(correct_zoom(3.0, f64::NAN, 600.0).is_finite());
    }

    #[test]
    fn non_finite_desired_counts_as_zero() {
        assert_eq!(correct_zoom(f64::NAN, 300.0, 300.0), 0.0);
        assert_eq!(correct_zoom(f64::INFINITY, 300.0, 300.0), 0.0);
    }

    #[test]
    fn framing_reapplies_once_after_settle() {
        let mut framing = PaneFraming::new();
        // freshly shown pane still reports zero height
        let initial = framing.show(3.0, PaneDimensions::new(0.0, 1200.0));
        assert_eq!(initial, 0.0);
        assert!(framing.awaiting_settle());

        let settled = framing.layout_settled(PaneDimensions::new(300.0, 1200.0));
        assert_eq!(settled.map(|z| (z - 1.0).abs() < 1e-9), Some(true));
        assert!(!framing.awaiting_settle());

        assert_eq!(
            framing.layout_settled(PaneDimensions::new(600.0, 1200.0)),
            None
        );
    }

    #[test]
    fn settle_without_show_is_ignored() {
        let mut framing = PaneFraming::new();
        assert_eq!(
            framing.layout_settled(PaneDimensions::new(300.0, 1200.0)),
            None
        );
    }

    #[test]
    fn each_show_arms_a_new_settle() {
        let mut framing = PaneFraming::new();
        framing.show(2.0, PaneDimensions::new(600.0, 1200.0));
        assert!(framing.layout_settled(PaneDimensions::new(600.0, 1200.0)).is_some());
        framing.show(4.0, PaneDimensions::new(600.0, 1200.0));
        let z = framing
            .layout_settled(PaneDimensions::new(1200.0, 1200.0))
            .unwrap();
        assert!((z - 4.0).abs() < 1e-9);
    }
}
