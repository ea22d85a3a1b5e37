//! Print a document's outline.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use gcare_markdown::Section;
use gcare_static::SiteConfig;
use gcare_viewer::{DocumentSource, FsSource, HttpSource, MarkdownViewer, ViewerPage};

/// Run the outline command.
pub async fn run(config_path: &Path, path: &str, base_url: Option<&str>, json: bool) -> Result<()> {
    let site = SiteConfig::load(config_path)?;

    let page = match base_url {
        Some(url) => open(HttpSource::new(url), &site, path).await?,
        None => open(FsSource::new(&site.site.docs_dir), &site, path).await?,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&page.sections).context("Failed to encode outline")?
        );
    } else {
        print!("{}", format_outline(&page.sections));
    }

    Ok(())
}

/// Open `path` in a viewer session. A failed load is an error here.
async fn open<S: DocumentSource>(source: S, site: &SiteConfig, path: &str) -> Result<ViewerPage> {
    let mut viewer = MarkdownViewer::new(source, site.build.renderer, site.tracker.clone());

    let page = viewer.open(path).await.clone();
    viewer.close();

    if let Some(error) = page.error {
        anyhow::bail!(error);
    }

    tracing::debug!(
        "{} has {} sections and {} anchors",
        path,
        page.sections.len(),
        page.rendered.anchors.len()
    );

    Ok(page)
}

/// One line per section, level 3 entries indented under level 2.
fn format_outline(sections: &[Section]) -> String {
    let mut out = String::new();

    for section in sections {
        let indent = if section.level > 2 { "  " } else { "" };
        let _ = writeln!(out, "{}{} (#{})", indent, section.title, section.id);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn formats_nested_outline() {
        let sections = vec![
            Section {
                title: "Intro".to_string(),
                id: "intro".to_string(),
                level: 2,
            },
            Section {
                title: "Details".to_string(),
                id: "details".to_string(),
                level: 3,
            },
        ];

        assert_eq!(
            format_outline(&sections),
            "Intro (#intro)\n  Details (#details)\n"
        );
    }

    #[tokio::test]
    async fn opens_from_docs_dir() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("terms.md"),
            "## Intro\ntext\n### Details\nmore",
        )
        .unwrap();

        let page = open(
            FsSource::new(temp.path()),
            &SiteConfig::default(),
            "/terms.md",
        )
        .await
        .unwrap();

        assert_eq!(page.sections.len(), 2);
        assert_eq!(page.rendered.anchors, vec!["intro", "details"]);
    }

    #[tokio::test]
    async fn missing_document_is_an_error() {
        let temp = tempdir().unwrap();

        let err = open(
            FsSource::new(temp.path()),
            &SiteConfig::default(),
            "/nope.md",
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("could not be loaded"));
    }
}
