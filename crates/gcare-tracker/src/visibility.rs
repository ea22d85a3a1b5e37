//! Visibility-based tracking.
//!
//! Models a viewport observer with a top/bottom margin inset: only headings
//! inside a thin trigger band count, and the topmost of those wins.

use crate::strategy::{HeadingPosition, ScrollState, TrackingStrategy};

/// Trigger-band strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityStrategy {
    /// Fraction of the viewport height cut off at the top
    pub top_inset: f64,
    /// Fraction of the viewport height cut off at the bottom
    pub bottom_inset: f64,
}

impl VisibilityStrategy {
    pub fn new(top_inset: f64, bottom_inset: f64) -> Self {
        Self {
            top_inset,
            bottom_inset,
        }
    }

    /// Viewport-relative `(top, bottom)` of the trigger band.
    pub fn band(&self, viewport_height: f64) -> (f64, f64) {
        (
            viewport_height * self.top_inset,
            viewport_height * (1.0 - self.bottom_inset),
        )
    }
}

impl Default for VisibilityStrategy {
    fn default() -> Self {
        Self::new(0.2, 0.7)
    }
}

impl TrackingStrategy for VisibilityStrategy {
    fn name(&self) -> &'static str {
        "visibility"
    }

    fn compute_active<'a>(
        &self,
        headings: &'a [HeadingPosition],
        scroll: &ScrollState,
    ) -> Option<&'a str> {
        let (band_top, band_bottom) = self.band(scroll.viewport_height);
        if band_bottom < band_top {
            return None;
        }

        headings
            .iter()
            .map(|h| (h, h.top - scroll.scroll_y))
            .filter(|(h, rel_top)| *rel_top <= band_bottom && rel_top + h.height >= band_top)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(h, _)| h.id.as_str())
    }
}
