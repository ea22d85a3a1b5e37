//! Document loading and the markdown viewer session.

pub mod loader;
pub mod viewer;

pub use loader::{
    Document, DocumentLoader, DocumentSource, FsSource, HttpSource, LoadError, LoadOutcome,
    LoadState,
};
pub use viewer::{MarkdownViewer, ViewerPage};
