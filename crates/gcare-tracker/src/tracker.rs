//! Section tracker state machine.
//!
//! ```text
//! Idle --attach(anchors)--> Tracking --detach--> Idle
//! ```
//!
//! While tracking, scroll events update the active section through the
//! configured [`TrackingStrategy`]. Manual navigation suspends automatic
//! tracking for a cooldown; each navigation gets a new generation so a stale
//! deferred [`SectionTracker::resume`] cannot end a newer suspension.

use std::time::Instant;

use crate::config::TrackerConfig;
use crate::strategy::{bottom_override, HeadingPosition, ScrollState, TrackingStrategy};

/// Attachment phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Attached to the rendered headings with these ids
    Tracking { anchors: Vec<String> },
}

/// Manual-navigation cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Automatic tracking is live
    #[default]
    Idle,
    /// Automatic tracking is paused until `expires_at`
    Suspended {
        generation: u64,
        expires_at: Instant,
    },
}

/// Scroll the host should perform after a manual navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollCommand {
    /// Target heading id
    pub target: String,

    /// Document offset to scroll to (heading top minus the configured offset)
    pub top: f64,

    /// Always smooth for manual navigation
    pub smooth: bool,

    /// Navigation generation to pass back to [`SectionTracker::resume`]
    pub generation: u64,
}

/// Errors from manual navigation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("No rendered heading with id '{0}'")]
    UnknownSection(String),

    #[error("Tracker is not attached to a rendered document")]
    Detached,
}

/// Keeps the active outline entry in sync with the reader's position.
pub struct SectionTracker {
    config: TrackerConfig,
    strategy: Box<dyn TrackingStrategy>,
    phase: Phase,
    navigation: Navigation,
    generation: u64,
    active: Option<String>,
    overlay_open: bool,
}

impl SectionTracker {
    /// Create a tracker using the strategy named in `config`.
    pub fn new(config: TrackerConfig) -> Self {
        let strategy = config.build_strategy();
        Self::with_strategy(config, strategy)
    }

    /// Create a tracker with an explicit strategy.
    pub fn with_strategy(config: TrackerConfig, strategy: Box<dyn TrackingStrategy>) -> Self {
        Self {
            config,
            strategy,
            phase: Phase::Idle,
            navigation: Navigation::Idle,
            generation: 0,
            active: None,
            overlay_open: false,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, Phase::Tracking { .. })
    }

    /// Ids of the headings currently tracked.
    pub fn anchors(&self) -> &[String] {
        match &self.phase {
            Phase::Tracking { anchors } => anchors,
            Phase::Idle => &[],
        }
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// Open or close the mobile outline overlay. Returns the new state.
    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay_open = !self.overlay_open;
        self.overlay_open
    }

    /// Start tracking the headings a render produced.
    ///
    /// Attaching while already tracking detaches first, so registrations never
    /// outlive the document they belong to.
    pub fn attach(&mut self, anchors: Vec<String>) {
        if self.is_tracking() {
            self.detach();
        }

        tracing::debug!(
            "Tracking {} headings with {} strategy",
            anchors.len(),
            self.strategy.name()
        );
        self.phase = Phase::Tracking { anchors };
    }

    /// Stop tracking and drop all per-document state. No-op when idle.
    pub fn detach(&mut self) {
        if let Phase::Tracking { anchors } = std::mem::take(&mut self.phase) {
            tracing::debug!("Detached from {} headings", anchors.len());
        }
        self.navigation = Navigation::Idle;
        self.active = None;
        self.overlay_open = false;
    }

    /// Whether automatic tracking is paused at `now`.
    pub fn is_suspended(&self, now: Instant) -> bool {
        matches!(self.navigation, Navigation::Suspended { expires_at, .. } if now < expires_at)
    }

    /// End the suspension started by navigation `generation`.
    ///
    /// Returns `false` when that navigation has already been superseded or
    /// the tracker is not suspended.
    pub fn resume(&mut self, generation: u64) -> bool {
        match self.navigation {
            Navigation::Suspended {
                generation: current,
                ..
            } if current == generation => {
                self.navigation = Navigation::Idle;
                true
            }
            _ => false,
        }
    }

    /// Handle a scroll tick. Returns the active section afterwards.
    ///
    /// `headings` are the measured positions of rendered headings in document
    /// order; ids that are not attached are ignored.
    pub fn on_scroll(
        &mut self,
        headings: &[HeadingPosition],
        scroll: &ScrollState,
        now: Instant,
    ) -> Option<&str> {
        let Phase::Tracking { anchors } = &self.phase else {
            return None;
        };

        if let Navigation::Suspended { expires_at, .. } = self.navigation {
            if now < expires_at {
                return self.active.as_deref();
            }
            self.navigation = Navigation::Idle;
        }

        let tracked: Vec<HeadingPosition> = headings
            .iter()
            .filter(|h| anchors.contains(&h.id))
            .cloned()
            .collect();

        let next = bottom_override(&tracked, scroll, self.config.bottom_threshold)
            .or_else(|| self.strategy.compute_active(&tracked, scroll))
            .map(str::to_string);

        if let Some(id) = next {
            if self.active.as_deref() != Some(id.as_str()) {
                tracing::trace!("Active section: {}", id);
                self.active = Some(id);
            }
        }

        self.active.as_deref()
    }

    /// Jump to a section from its outline entry.
    ///
    /// Sets it active, suspends automatic tracking for the cooldown, closes
    /// the overlay and returns where to scroll. An unknown id changes nothing.
    pub fn navigate(
        &mut self,
        id: &str,
        headings: &[HeadingPosition],
        now: Instant,
    ) -> Result<ScrollCommand, TrackerError> {
        let Phase::Tracking { anchors } = &self.phase else {
            return Err(TrackerError::Detached);
        };

        let Some(heading) = headings
            .iter()
            .find(|h| h.id == id && anchors.iter().any(|a| a == id))
        else {
            tracing::warn!("Element with id '{}' not found", id);
            return Err(TrackerError::UnknownSection(id.to_string()));
        };

        let top = (heading.top - self.config.scroll_offset).max(0.0);

        self.generation += 1;
        self.navigation = Navigation::Suspended {
            generation: self.generation,
            expires_at: now.checked_add(self.config.cooldown()).unwrap_or(now),
        };
        self.active = Some(id.to_string());
        self.overlay_open = false;

        tracing::debug!("Navigating to '{}' at {}", id, top);

        Ok(ScrollCommand {
            target: id.to_string(),
            top,
            smooth: true,
            generation: self.generation,
        })
    }
}

impl std::fmt::Debug for SectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionTracker")
            .field("strategy", &self.strategy.name())
            .field("phase", &self.phase)
            .field("navigation", &self.navigation)
            .field("active", &self.active)
            .field("overlay_open", &self.overlay_open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyKind;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn headings() -> Vec<HeadingPosition> {
        vec![
            HeadingPosition::new("intro", 200.0, 30.0),
            HeadingPosition::new("details", 900.0, 30.0),
            HeadingPosition::new("contact", 1600.0, 30.0),
        ]
    }

    fn anchors() -> Vec<String> {
        headings().into_iter().map(|h| h.id).collect()
    }

    fn at(scroll_y: f64) -> ScrollState {
        ScrollState {
            scroll_y,
            viewport_height: 800.0,
            document_height: 3000.0,
        }
    }

    fn position_tracker() -> SectionTracker {
        let mut tracker = SectionTracker::new(TrackerConfig {
            strategy: StrategyKind::Position,
            ..Default::default()
        });
        tracker.attach(anchors());
        tracker
    }

    #[test]
    fn idle_tracker_ignores_scroll() {
        let mut tracker = SectionTracker::new(TrackerConfig::default());

        assert_eq!(
            tracker.on_scroll(&headings(), &at(900.0), Instant::now()),
            None
        );
        assert_eq!(
            tracker.navigate("intro", &headings(), Instant::now()),
            Err(TrackerError::Detached)
        );
    }

    #[test]
    fn follows_scroll_position() {
        let mut tracker = position_tracker();
        let now = Instant::now();

        assert_eq!(tracker.on_scroll(&headings(), &at(0.0), now), None);
        assert_eq!(
            tracker.on_scroll(&headings(), &at(100.0), now),
            Some("intro")
        );
        assert_eq!(
            tracker.on_scroll(&headings(), &at(800.0), now),
            Some("details")
        );
    }

    #[test]
    fn huge_cooldown_keeps_navigation_suspended() {
        let mut tracker = SectionTracker::new(TrackerConfig {
            strategy: StrategyKind::Position,
            cooldown_ms: u64::MAX,
            ..Default::default()
        });
        tracker.attach(anchors());
        let now = Instant::now();

        tracker.navigate("details", &headings(), now).unwrap();

        let later = now + Duration::from_secs(30);
        assert_eq!(
            tracker.on_scroll(&headings(), &at(0.0), later),
            Some("details")
        );
    }

    #[test]
    fn bottom_forces_last_heading() {
        let mut tracker = SectionTracker::new(TrackerConfig::default());
        tracker.attach(anchors());

        // Visibility band would see nothing at this offset
        let near_bottom = at(2150.0);
        assert!(near_bottom.distance_to_bottom() < 100.0);
        assert_eq!(
            tracker.on_scroll(&headings(), &near_bottom, Instant::now()),
            Some("contact")
        );
    }

    #[test]
    fn navigation_scrolls_with_offset_and_suspends() {
        let mut tracker = position_tracker();
        let now = Instant::now();

        tracker.toggle_overlay();
        let command = tracker.navigate("details", &headings(), now).unwrap();

        assert_eq!(command.target, "details");
        assert_eq!(command.top, 820.0);
        assert!(command.smooth);
        assert_eq!(tracker.active_section(), Some("details"));
        assert!(!tracker.is_overlay_open());

        // Scroll events during the cooldown leave the active id alone
        let during = now + Duration::from_millis(500);
        assert_eq!(
            tracker.on_scroll(&headings(), &at(0.0), during),
            Some("details")
        );
        assert_eq!(
            tracker.on_scroll(&headings(), &at(2150.0), during),
            Some("details")
        );

        // After the cooldown tracking resumes
        let after = now + Duration::from_millis(1000);
        assert_eq!(
            tracker.on_scroll(&headings(), &at(100.0), after),
            Some("intro")
        );
        assert_eq!(tracker.navigation(), Navigation::Idle);
    }

    #[test]
    fn navigation_offset_clamps_at_document_top() {
        let mut tracker = position_tracker();
        let top = [HeadingPosition::new("intro", 30.0, 20.0)];
        let command = tracker.navigate("intro", &top, Instant::now()).unwrap();

        assert_eq!(command.top, 0.0);
    }

    #[test]
    fn unknown_target_has_no_side_effects() {
        let mut tracker = position_tracker();
        let now = Instant::now();
        tracker.on_scroll(&headings(), &at(100.0), now);
        tracker.toggle_overlay();

        let result = tracker.navigate("missing", &headings(), now);

        assert_eq!(
            result,
            Err(TrackerError::UnknownSection("missing".to_string()))
        );
        assert_eq!(tracker.active_section(), Some("intro"));
        assert_eq!(tracker.navigation(), Navigation::Idle);
        assert!(tracker.is_overlay_open());
    }

    #[test]
    fn stale_resume_does_not_end_newer_suspension() {
        let mut tracker = position_tracker();
        let now = Instant::now();

        let first = tracker.navigate("intro", &headings(), now).unwrap();
        let second = tracker
            .navigate("contact", &headings(), now + Duration::from_millis(600))
            .unwrap();

        // First navigation's deferred clear fires late
        assert!(!tracker.resume(first.generation));
        assert!(tracker.is_suspended(now + Duration::from_millis(1200)));
        assert_eq!(
            tracker.on_scroll(&headings(), &at(100.0), now + Duration::from_millis(1200)),
            Some("contact")
        );

        assert!(tracker.resume(second.generation));
        assert!(!tracker.is_suspended(now + Duration::from_millis(1200)));
    }

    #[test]
    fn attach_and_detach_are_paired() {
        let mut tracker = position_tracker();
        tracker.on_scroll(&headings(), &at(100.0), Instant::now());

        tracker.attach(vec!["other".to_string()]);
        assert_eq!(tracker.anchors().to_vec(), vec!["other".to_string()]);
        assert_eq!(tracker.active_section(), None);

        tracker.detach();
        tracker.detach();
        assert!(!tracker.is_tracking());
        assert!(tracker.anchors().is_empty());
    }

    #[test]
    fn unattached_headings_are_ignored() {
        let mut tracker = position_tracker();
        tracker.attach(vec!["intro".to_string()]);

        assert_eq!(
            tracker.on_scroll(&headings(), &at(800.0), Instant::now()),
            Some("intro")
        );
    }

    #[test]
    fn empty_document_tracks_nothing() {
        let mut tracker = SectionTracker::new(TrackerConfig::default());
        tracker.attach(Vec::new());

        let scroll = ScrollState {
            scroll_y: 0.0,
            viewport_height: 800.0,
            document_height: 800.0,
        };
        assert_eq!(tracker.on_scroll(&[], &scroll, Instant::now()), None);
        assert!(matches!(
            tracker.navigate("intro", &[], Instant::now()),
            Err(TrackerError::UnknownSection(_))
        ));
        tracker.detach();
    }
}
