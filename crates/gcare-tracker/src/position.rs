//! Position-based tracking, evaluated on every scroll tick.

use crate::strategy::{HeadingPosition, ScrollState, TrackingStrategy};

/// Last heading at or above the scroll position plus a lookahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionStrategy {
    /// Distance below the viewport top at which a heading becomes current
    pub lookahead: f64,
}

impl PositionStrategy {
    pub fn new(lookahead: f64) -> Self {
        Self { lookahead }
    }
}

impl Default for PositionStrategy {
    fn default() -> Self {
        Self::new(150.0)
    }
}

impl TrackingStrategy for PositionStrategy {
    fn name(&self) -> &'static str {
        "position"
    }

    fn compute_active<'a>(
        &self,
        headings: &'a [HeadingPosition],
        scroll: &ScrollState,
    ) -> Option<&'a str> {
        let line = scroll.scroll_y + self.lookahead;

        headings
            .iter()
            .rev()
            .find(|h| h.top <= line)
            .map(|h| h.id.as_str())
    }
}
