//! Tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::position::PositionStrategy;
use crate::strategy::{StrategyKind, TrackingStrategy};
use crate::visibility::VisibilityStrategy;

/// Longest navigation cooldown honored; larger settings are clamped.
pub const MAX_COOLDOWN_MS: u64 = 60_000;

/// Tunables for section tracking and manual navigation.
///
/// Serialized into built pages so the browser runtime uses the same values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Active-section algorithm
    pub strategy: StrategyKind,

    /// Visibility band: fraction of the viewport cut off at the top
    pub top_inset: f64,

    /// Visibility band: fraction of the viewport cut off at the bottom
    pub bottom_inset: f64,

    /// Position lookahead in pixels
    pub lookahead: f64,

    /// Distance from the document bottom that forces the last heading
    pub bottom_threshold: f64,

    /// Gap left above a heading after manual navigation (sticky header)
    pub scroll_offset: f64,

    /// How long automatic tracking stays suspended after manual navigation
    pub cooldown_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Visibility,
            top_inset: 0.2,
            bottom_inset: 0.7,
            lookahead: 150.0,
            bottom_threshold: 100.0,
            scroll_offset: 80.0,
            cooldown_ms: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms.min(MAX_COOLDOWN_MS))
    }

    /// Build the configured strategy.
    pub fn build_strategy(&self) -> Box<dyn TrackingStrategy> {
        match self.strategy {
            StrategyKind::Visibility => {
                Box::new(VisibilityStrategy::new(self.top_inset, self.bottom_inset))
            }
            StrategyKind::Position => Box::new(PositionStrategy::new(self.lookahead)),
        }
    }
}
