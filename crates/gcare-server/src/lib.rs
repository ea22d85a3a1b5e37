//! Development and preview server for the GCare site.
//!
//! Serves a built site, picking the variant page from the request host the
//! way production subdomains do. The dev server also rebuilds on changes to
//! the docs or `site.toml` and tells connected pages to reload.

pub mod dev;
pub mod live;
pub mod server;
pub mod watcher;

pub use dev::{DevServer, DevServerConfig};
pub use live::{LiveHub, LiveMessage};
pub use server::{router, PreviewServer, ServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
