//! Scaffold a site in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing GCare site...");

    scaffold(config_path, Path::new("docs"), yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'gcare dev' to start the development server.");

    Ok(())
}

/// Write the config and default documents. Existing files are kept unless
/// `overwrite` is set.
fn scaffold(config_path: &Path, docs_dir: &Path, overwrite: bool) -> Result<usize> {
    fs::create_dir_all(docs_dir).context("Failed to create docs directory")?;

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (docs_dir.join("index.md"), DEFAULT_INDEX),
        (docs_dir.join("faculty.md"), DEFAULT_FACULTY),
        (docs_dir.join("terms.md"), DEFAULT_TERMS),
        (docs_dir.join("privacy.md"), DEFAULT_PRIVACY),
    ];

    let mut written = 0;
    for (path, contents) in files {
        if path.exists() && !overwrite {
            tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
            continue;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
        written += 1;
    }

    Ok(written)
}

const DEFAULT_CONFIG: &str = r#"# GCare site configuration

[site]
title = "GCare - JRMSU Guidance"
domain = "jrmsu-gcare.com"
docs_dir = "docs"
output = "dist"
base_url = "/"

[build]
minify = true
# "line" keeps to headings, paragraphs, lists and links; "commonmark" renders everything
renderer = "line"

[tracker]
# "visibility" watches a band of the viewport, "position" follows the scroll offset
strategy = "visibility"
cooldown_ms = 1000

# Without [[pages]] the main, faculty, terms and privacy pages are built.
# [[pages]]
# variant = "terms"
# source = "terms.md"
# title = "Terms & Conditions - GCare JRMSU"
# noindex = true
"#;

const DEFAULT_INDEX: &str = r#"# GCare

Book JRMSU Guidance appointments with QR code verification.

## Download

- [Download the latest APK](https://www.jrmsu-gcare.com)

## How it works

Pick a counselor, choose a time and show your QR code at the guidance office.
"#;

const DEFAULT_FACULTY: &str = r#"# Faculty

Guidance counselors manage their schedules and verify appointments from the faculty app.

## Guidance services

Counseling, consultations and referrals are handled through GCare.
"#;

const DEFAULT_TERMS: &str = r#"# Terms & Conditions

## Acceptance of Terms

By using GCare you agree to these terms.

## Use of the Service

GCare is for scheduling appointments with the JRMSU Guidance office.

### Accounts

You are responsible for activity under your account.

### Appointments

Appointments are confirmed only after QR code verification.

## Changes to These Terms

We may update these terms. Continued use means you accept the changes.

## Contact

- [Guidance office](https://www.jrmsu-gcare.com)
"#;

const DEFAULT_PRIVACY: &str = r#"# Privacy Policy

## Information We Collect

We collect your name, student number and appointment details.

## How We Use Information

Information is used only to schedule and verify appointments.

### Data Retention

Appointment records are kept for the current school year.

## Your Rights

You may ask the guidance office to correct or delete your information.

## Contact

- [Guidance office](https://www.jrmsu-gcare.com)
"#;
