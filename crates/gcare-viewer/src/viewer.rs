//! The markdown viewer session.
//!
//! Wires the pieces together in their lifecycle order: load the document,
//! derive its outline, render it, then attach tracking to the headings the
//! render reported. Opening another path tears all of it down first.

use std::time::Instant;

use gcare_markdown::{extract_outline, RenderedDocument, Renderer, RendererKind, Section};
use gcare_tracker::{
    HeadingPosition, ScrollCommand, ScrollState, SectionTracker, TrackerConfig, TrackerError,
};

use crate::loader::{Document, DocumentLoader, DocumentSource, LoadOutcome};

/// Everything a host needs to draw the current document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerPage {
    /// Path the page was opened with
    pub path: String,

    /// Navigable outline
    pub sections: Vec<Section>,

    /// Rendered body and its heading anchors
    pub rendered: RenderedDocument,

    /// Message to show instead of content when loading failed
    pub error: Option<String>,
}

impl ViewerPage {
    fn empty(path: &str, error: Option<String>) -> Self {
        Self {
            path: path.to_string(),
            error,
            ..Default::default()
        }
    }
}

/// A document view with a scroll-synchronized outline.
pub struct MarkdownViewer<S> {
    loader: DocumentLoader<S>,
    renderer: Box<dyn Renderer>,
    tracker: SectionTracker,
    page: Option<ViewerPage>,
}

impl<S: DocumentSource> MarkdownViewer<S> {
    pub fn new(source: S, renderer: RendererKind, tracker: TrackerConfig) -> Self {
        Self {
            loader: DocumentLoader::new(source),
            renderer: renderer.renderer(),
            tracker: SectionTracker::new(tracker),
            page: None,
        }
    }

    pub fn loader(&self) -> &DocumentLoader<S> {
        &self.loader
    }

    pub fn tracker(&self) -> &SectionTracker {
        &self.tracker
    }

    pub fn is_loading(&self) -> bool {
        self.loader.snapshot().loading
    }

    /// The open page, once loading has finished.
    pub fn page(&self) -> Option<&ViewerPage> {
        self.page.as_ref()
    }

    pub fn sections(&self) -> &[Section] {
        self.page
            .as_ref()
            .map(|p| p.sections.as_slice())
            .unwrap_or(&[])
    }

    pub fn active_section(&self) -> Option<&str> {
        self.tracker.active_section()
    }

    /// Open a document, replacing whatever was open.
    ///
    /// A failed load yields an empty page carrying an error message; it never
    /// returns an error itself.
    pub async fn open(&mut self, path: &str) -> &ViewerPage {
        self.close();

        let page = match self.loader.load(path).await {
            LoadOutcome::Loaded(document) => self.present(&document),
            LoadOutcome::Failed(_) => ViewerPage::empty(path, self.loader.snapshot().error),
            LoadOutcome::Superseded => ViewerPage::empty(path, None),
        };

        // Rendering is complete: the anchors are exactly the headings that exist
        self.tracker.attach(page.rendered.anchors.clone());

        self.page.insert(page)
    }

    /// Detach tracking and drop the open page.
    pub fn close(&mut self) {
        self.tracker.detach();
        self.page = None;
    }

    fn present(&self, document: &Document) -> ViewerPage {
        let sections = extract_outline(&document.text);
        let rendered = self.renderer.render(&document.text);

        for section in &sections {
            if !rendered.anchors.contains(&section.id) {
                tracing::warn!(
                    "Outline entry '{}' has no rendered heading in {} ({} renderer)",
                    section.id,
                    document.path,
                    self.renderer.name()
                );
            }
        }

        ViewerPage {
            path: document.path.clone(),
            sections,
            rendered,
            error: None,
        }
    }

    /// Feed a scroll tick to the tracker.
    pub fn on_scroll(
        &mut self,
        headings: &[HeadingPosition],
        scroll: &ScrollState,
        now: Instant,
    ) -> Option<&str> {
        self.tracker.on_scroll(headings, scroll, now)
    }

    /// Activate an outline entry.
    pub fn navigate(
        &mut self,
        id: &str,
        headings: &[HeadingPosition],
        now: Instant,
    ) -> Result<ScrollCommand, TrackerError> {
        self.tracker.navigate(id, headings, now)
    }

    /// Deferred end of a navigation cooldown.
    pub fn resume(&mut self, generation: u64) -> bool {
        self.tracker.resume(generation)
    }

    /// Toggle the mobile outline overlay.
    pub fn toggle_outline(&mut self) -> bool {
        self.tracker.toggle_overlay()
    }
}
