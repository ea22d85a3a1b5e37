//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use gcare_markdown::RendererKind;
use gcare_tracker::TrackerConfig;
use gcare_viewer::{FsSource, MarkdownViewer, ViewerPage};

use crate::assets::AssetPipeline;
use crate::config::{PageConfig, SiteConfig};
use crate::site::SiteVariant;
use crate::templates::{FooterLink, PageContext, TemplateEngine, ROBOTS_INDEX, ROBOTS_NOINDEX};

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Base URL for asset links
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Production domain, used for canonical URLs and the sitemap
    pub domain: String,

    /// Markdown renderer
    pub renderer: RendererKind,

    /// Settings injected into every page for the browser runtime
    pub tracker: TrackerConfig,

    /// Pages to build
    pub pages: Vec<PageConfig>,

    /// Include the dev live reload client
    pub live_reload: bool,

    /// Dev server port; footer links then point at localhost
    pub dev_port: Option<u16>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

impl BuildConfig {
    /// Build settings from a loaded `site.toml`.
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            docs_dir: PathBuf::from(&site.site.docs_dir),
            output_dir: PathBuf::from(&site.site.output),
            minify: site.build.minify,
            base_url: site.site.base_url.clone(),
            title: site.site.title.clone(),
            domain: site.site.domain.clone(),
            renderer: site.build.renderer,
            tracker: site.tracker.clone(),
            pages: site.pages(),
            live_reload: false,
            dev_port: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Pages whose source could not be loaded
    pub failed: usize,

    /// Outline entries across all pages
    pub sections: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to read docs directory: {0}")]
    ReadError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page whose source has been loaded and rendered.
#[derive(Debug)]
struct LoadedPage {
    config: PageConfig,
    view: ViewerPage,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if !self.config.docs_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Docs directory not found: {}",
                self.config.docs_dir.display()
            )));
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let pages = self.load_pages().await;

        // Render and write pages in parallel
        let results: Vec<Result<usize, BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(page))
            .collect();

        let mut sections = 0;
        for result in results {
            sections += result?;
        }

        self.generate_assets()?;
        self.copy_documents()?;
        self.generate_sitemap(&pages)?;

        let failed = pages.iter().filter(|p| p.view.error.is_some()).count();

        Ok(BuildResult {
            pages: pages.len(),
            failed,
            sections,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Load, outline and render every page through a viewer session.
    ///
    /// A page whose source fails to load is still built, showing the load
    /// error in place of its content.
    async fn load_pages(&self) -> Vec<LoadedPage> {
        let mut viewer = MarkdownViewer::new(
            FsSource::new(&self.config.docs_dir),
            self.config.renderer,
            self.config.tracker.clone(),
        );

        let mut pages = Vec::with_capacity(self.config.pages.len());
        for config in &self.config.pages {
            let view = viewer.open(&config.source).await.clone();

            tracing::debug!(
                "Loaded {} for {} ({} sections)",
                config.source,
                config.variant,
                view.sections.len()
            );

            pages.push(LoadedPage {
                config: config.clone(),
                view,
            });
        }
        viewer.close();

        pages
    }

    /// Output files for a variant. The main variant is also the site index.
    fn output_paths(&self, variant: &SiteVariant) -> Vec<PathBuf> {
        let mut paths = vec![self
            .config
            .output_dir
            .join(variant.as_str())
            .join("index.html")];

        if *variant == SiteVariant::Main {
            paths.push(self.config.output_dir.join("index.html"));
        }

        paths
    }

    /// Links to the legal pages shown on every page.
    fn footer_links(&self) -> Vec<FooterLink> {
        [
            (SiteVariant::Terms, "Terms and Conditions"),
            (SiteVariant::Privacy, "Privacy Policy"),
        ]
        .into_iter()
        .map(|(variant, label)| FooterLink {
            label: label.to_string(),
            href: variant.url(&self.config.domain, self.config.dev_port),
        })
        .collect()
    }

    /// Build a single page. Returns the number of outline entries it shows.
    fn build_page(&self, page: &LoadedPage) -> Result<usize, BuildError> {
        let toc = if page.config.toc {
            page.view.sections.clone()
        } else {
            Vec::new()
        };
        let sections = toc.len();

        let tracker = serde_json::to_string(&self.config.tracker)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        let context = PageContext {
            title: page.config.title.clone(),
            site_title: self.config.title.clone(),
            description: page.config.description.clone(),
            keywords: page.config.keywords.clone(),
            robots: if page.config.noindex {
                ROBOTS_NOINDEX
            } else {
                ROBOTS_INDEX
            }
            .to_string(),
            canonical: page.config.variant.url(&self.config.domain, None),
            content: page.view.rendered.html.clone(),
            toc,
            error: page.view.error.clone(),
            base_url: self.config.base_url.clone(),
            tracker,
            footer: self.footer_links(),
            live_reload: self.config.live_reload,
        };

        let html = self
            .templates
            .render_page("page.html", &context)
            .map_err(|e: minijinja::Error| BuildError::TemplateError(e.to_string()))?;

        for path in self.output_paths(&page.config.variant) {
            write_file(&path, &html)?;
        }

        Ok(sections)
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Skipping CSS minification: {}", e);
                css
            })
        } else {
            css
        };
        write_file(&assets_dir.join("main.css"), &css)?;

        write_file(&assets_dir.join("viewer.js"), &AssetPipeline::generate_js())?;

        Ok(())
    }

    /// Copy the raw markdown sources to `docs/` in the output.
    fn copy_documents(&self) -> Result<(), BuildError> {
        let target = self.config.output_dir.join("docs");

        for entry in WalkDir::new(&self.config.docs_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let relative = path.strip_prefix(&self.config.docs_dir).unwrap_or(path);
            let dest = target.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(path, &dest).map_err(|e| {
                BuildError::WriteError(format!("{}: {}", dest.display(), e))
            })?;
        }

        Ok(())
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(&self, pages: &[LoadedPage]) -> Result<(), BuildError> {
        let urls: Vec<String> = pages
            .iter()
            .filter(|page| !page.config.noindex)
            .map(|page| {
                format!(
                    "  <url>\n    <loc>{}/</loc>\n  </url>",
                    page.config.variant.url(&self.config.domain, None)
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );
        write_file(&self.config.output_dir.join("sitemap.xml"), &sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n",
            SiteVariant::Main.url(&self.config.domain, None)
        );
        write_file(&self.config.output_dir.join("robots.txt"), &robots)?;

        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}
