//! Site configuration (`site.toml`).

use std::fs;
use std::path::Path;

use gcare_markdown::RendererKind;
use gcare_tracker::TrackerConfig;
use serde::Deserialize;

use crate::builder::BuildError;
use crate::site::SiteVariant;

/// Configuration file structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            domain: default_domain(),
            docs_dir: default_docs_dir(),
            output: default_output(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
    #[serde(default)]
    pub renderer: RendererKind,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
            renderer: RendererKind::default(),
        }
    }
}

/// One page of the site.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageConfig {
    pub variant: SiteVariant,

    /// Markdown source, relative to the docs directory
    pub source: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub keywords: String,

    /// Ask crawlers to skip this page and leave it out of the sitemap
    #[serde(default)]
    pub noindex: bool,

    /// Show the outline sidebar
    #[serde(default = "default_toc")]
    pub toc: bool,
}

fn default_title() -> String {
    "GCare".to_string()
}
fn default_domain() -> String {
    "jrmsu-gcare.com".to_string()
}
fn default_docs_dir() -> String {
    "docs".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_toc() -> bool {
    true
}

impl SiteConfig {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            BuildError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            BuildError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if let Some(page) = config.pages.iter().find(|p| !p.variant.is_known()) {
            return Err(BuildError::ConfigError(format!(
                "Unknown site variant '{}' for page {}",
                page.variant, page.source
            )));
        }

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Configured pages, or the default four when none are listed.
    pub fn pages(&self) -> Vec<PageConfig> {
        if self.pages.is_empty() {
            default_pages()
        } else {
            self.pages.clone()
        }
    }
}

/// The landing, faculty and legal pages.
pub fn default_pages() -> Vec<PageConfig> {
    vec![
        PageConfig {
            variant: SiteVariant::Main,
            source: "index.md".to_string(),
            title: "Download GCare APK - JRMSU Guidance QR Scheduling".to_string(),
            description: "Download GCare APK for Android. Book JRMSU Guidance appointments \
                          with QR code verification. Easy, secure, and fast scheduling for \
                          students."
                .to_string(),
            keywords: "gcare, guidance care, gcare app, download gcare apk, qr code \
                       appointment, jrmsu guidance, jrmsu appointment booking, qr code \
                       scheduling"
                .to_string(),
            noindex: false,
            toc: false,
        },
        PageConfig {
            variant: SiteVariant::Faculty,
            source: "faculty.md".to_string(),
            title: "Faculty - GCare JRMSU".to_string(),
            description: "JRMSU Faculty information and guidance services".to_string(),
            keywords: "jrmsu faculty, guidance counselors, faculty information".to_string(),
            noindex: true,
            toc: false,
        },
        PageConfig {
            variant: SiteVariant::Terms,
            source: "terms.md".to_string(),
            title: "Terms & Conditions - GCare JRMSU".to_string(),
            description: "Terms and conditions for using GCare appointment system".to_string(),
            keywords: "terms, conditions, gcare terms".to_string(),
            noindex: true,
            toc: true,
        },
        PageConfig {
            variant: SiteVariant::Privacy,
            source: "privacy.md".to_string(),
            title: "Privacy Policy - GCare JRMSU".to_string(),
            description: "Privacy policy for GCare appointment scheduling system".to_string(),
            keywords: "privacy policy, data protection, gcare privacy".to_string(),
            noindex: true,
            toc: true,
        },
    ]
}
