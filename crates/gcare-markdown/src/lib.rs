//! Markdown outline extraction and heading-anchored rendering.
//!
//! This crate turns a markdown document into a navigable outline of its level
//! 2 and 3 headings, and renders the document to HTML whose heading ids match
//! that outline.

pub mod commonmark;
pub mod outline;
pub mod render;
pub mod slug;

pub use commonmark::CommonMarkRenderer;
pub use outline::{classify_heading, extract_outline, HeadingLine, Section};
pub use render::{
    blocks_to_html, render_blocks, Block, LineRenderer, RenderedDocument, Renderer, RendererKind,
    Span,
};
pub use slug::slugify;
