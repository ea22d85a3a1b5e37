//! Static site builder for the GCare site.
//!
//! Renders each site variant's markdown page through the viewer session into
//! a standalone HTML page with its outline, plus the shared assets, raw
//! documents and sitemap.

pub mod assets;
pub mod builder;
pub mod config;
pub mod site;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use config::{default_pages, PageConfig, SiteConfig};
pub use site::SiteVariant;
