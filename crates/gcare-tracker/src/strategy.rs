//! Trait definitions for active-section strategies.

use serde::{Deserialize, Serialize};

/// Measured position of a rendered heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    /// Heading anchor id
    pub id: String,

    /// Offset of the heading's top edge from the document top
    pub top: f64,

    /// Rendered height of the heading box
    pub height: f64,
}

impl HeadingPosition {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }
}

/// Scroll metrics of the viewport at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Document offset at the top of the viewport
    pub scroll_y: f64,

    /// Height of the viewport
    pub viewport_height: f64,

    /// Total scrollable height of the document
    pub document_height: f64,
}

impl ScrollState {
    /// Remaining scroll distance below the viewport.
    pub fn distance_to_bottom(&self) -> f64 {
        self.document_height - (self.scroll_y + self.viewport_height)
    }
}

/// Which [`TrackingStrategy`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Trigger-band intersection, as a viewport observer would report it
    #[default]
    Visibility,
    /// Offset comparison on every scroll tick
    Position,
}

/// Decides which heading is "current" for a given scroll state.
///
/// Implementations are pure: they see only the headings passed in, in
/// document order, and never mutate tracker state.
pub trait TrackingStrategy: Send + Sync {
    /// Strategy identifier (e.g., "visibility", "position")
    fn name(&self) -> &'static str;

    /// Compute the active heading id, or `None` to leave the current one.
    fn compute_active<'a>(
        &self,
        headings: &'a [HeadingPosition],
        scroll: &ScrollState,
    ) -> Option<&'a str>;
}

/// The last heading, when the viewport is within `threshold` of the bottom.
///
/// Keeps the final section reachable even when it is too short to trigger
/// any strategy.
pub fn bottom_override<'a>(
    headings: &'a [HeadingPosition],
    scroll: &ScrollState,
    threshold: f64,
) -> Option<&'a str> {
    if scroll.distance_to_bottom() < threshold {
        headings.last().map(|h| h.id.as_str())
    } else {
        None
    }
}
