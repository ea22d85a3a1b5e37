//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gcare_static::{BuildConfig, SiteConfig, StaticBuilder};

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building site...");

    let site = SiteConfig::load(config_path)?;
    let defaults = BuildConfig::from_site(&site);

    let config = BuildConfig {
        output_dir: output.unwrap_or(defaults.output_dir.clone()),
        minify: minify.unwrap_or(defaults.minify),
        ..defaults
    };

    let result = StaticBuilder::new(config)
        .build()
        .await
        .context("Build failed")?;

    tracing::info!(
        "Built {} pages with {} outline entries in {}ms",
        result.pages,
        result.sections,
        result.duration_ms
    );
    if result.failed > 0 {
        tracing::warn!(
            "{} pages could not load their document and show an error instead",
            result.failed
        );
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
