//! Scroll-synchronized table of contents tracking.
//!
//! This crate decides which outline section is "current" as the reader
//! scrolls, and handles jumping to a section from its outline entry. It works
//! on measured heading positions and scroll metrics, so any host (a browser
//! runtime, a terminal pager, a test) can drive it.

pub mod config;
pub mod position;
pub mod strategy;
pub mod tracker;
pub mod visibility;

pub use config::{TrackerConfig, MAX_COOLDOWN_MS};
pub use position::PositionStrategy;
pub use strategy::{bottom_override, HeadingPosition, ScrollState, StrategyKind, TrackingStrategy};
pub use tracker::{Navigation, Phase, ScrollCommand, SectionTracker, TrackerError};
pub use visibility::VisibilityStrategy;
