//! Development server: build, watch, rebuild, reload.
//!
//! Dev builds carry the live reload client and localhost links, so they are
//! written to a temporary directory owned by the session and never to the
//! site's configured output.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use gcare_static::{BuildConfig, BuildResult, SiteConfig, StaticBuilder};

use crate::live::{LiveHub, LiveMessage};
use crate::server::{router, run, ServerConfig, ServerError};
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Path to `site.toml`
    pub config_path: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("site.toml"),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
    hub: LiveHub,
}

impl DevServer {
    pub fn new(config: DevServerConfig) -> Self {
        Self {
            config,
            hub: LiveHub::new(),
        }
    }

    pub fn hub(&self) -> &LiveHub {
        &self.hub
    }

    /// Server settings for serving a dev build from `output_dir`.
    fn server_config(&self, output_dir: &Path) -> ServerConfig {
        ServerConfig {
            output_dir: output_dir.to_path_buf(),
            port: self.config.port,
            host: self.config.host.clone(),
            open: self.config.open,
        }
    }

    /// Build once, then serve while rebuilding on changes.
    ///
    /// The build output is removed when the server stops.
    pub async fn start(self) -> Result<(), ServerError> {
        let output = dev_output()?;
        let output_dir = output.path().to_path_buf();
        let port = self.config.port;
        tracing::debug!("Dev build output: {}", output_dir.display());

        let result = build_site(&self.config.config_path, &output_dir, port).await?;
        log_build(&result);

        let docs_dir = SiteConfig::load(&self.config.config_path)?.site.docs_dir;
        let (watcher, mut rx) = FileWatcher::new(Path::new(&docs_dir), &self.config.config_path)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let config_path = self.config.config_path.clone();
        let rebuild_dir = output_dir.clone();
        let hub = self.hub.clone();
        tokio::spawn(async move {
            // Keep watcher alive for as long as events are handled
            let _watcher = watcher;
            while let Some(event) = rx.recv().await {
                handle_watch_event(&config_path, &rebuild_dir, port, &hub, event).await;
            }
        });

        let server = self.server_config(&output_dir);
        let app = router(&output_dir, Some(self.hub.clone()));
        let served = run(&server, app).await;

        drop(output);
        served
    }
}

/// Fresh temporary directory for a dev session's builds.
fn dev_output() -> Result<TempDir, ServerError> {
    tempfile::Builder::new()
        .prefix("gcare-dev-")
        .tempdir()
        .map_err(|e| ServerError::OutputError(e.to_string()))
}

/// Load `site.toml` and build into `output_dir` for the dev server on `port`.
pub async fn build_site(
    config_path: &Path,
    output_dir: &Path,
    port: u16,
) -> Result<BuildResult, ServerError> {
    let site = SiteConfig::load(config_path)?;

    let config = BuildConfig {
        output_dir: output_dir.to_path_buf(),
        live_reload: true,
        dev_port: Some(port),
        ..BuildConfig::from_site(&site)
    };

    Ok(StaticBuilder::new(config).build().await?)
}

/// Rebuild after a change and tell connected pages.
async fn handle_watch_event(
    config_path: &Path,
    output_dir: &Path,
    port: u16,
    hub: &LiveHub,
    event: WatchEvent,
) {
    match &event {
        WatchEvent::ConfigChanged(path) => tracing::info!("Config changed: {}", path.display()),
        WatchEvent::DocumentChanged(path) => {
            tracing::info!("Document changed: {}", path.display())
        }
        WatchEvent::DocumentRemoved(path) => {
            tracing::info!("Document removed: {}", path.display())
        }
    }

    match build_site(config_path, output_dir, port).await {
        Ok(result) => {
            log_build(&result);
            hub.send(LiveMessage::Reload);
        }
        Err(e) => {
            tracing::error!("Rebuild failed: {}", e);
            hub.send(LiveMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

fn log_build(result: &BuildResult) {
    tracing::info!(
        "Built {} pages ({} sections) in {}ms",
        result.pages,
        result.sections,
        result.duration_ms
    );
    if result.failed > 0 {
        tracing::warn!("{} pages could not load their document", result.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn project(root: &Path) -> PathBuf {
        let docs = root.join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("terms.md"), "## Scope").unwrap();

        let config = root.join("site.toml");
        fs::write(
            &config,
            format!(
                "[site]\ndocs_dir = \"{}\"\noutput = \"{}\"\n\n[[pages]]\nvariant = \"terms\"\nsource = \"terms.md\"\ntitle = \"Terms\"\n",
                docs.display(),
                root.join("dist").display()
            ),
        )
        .unwrap();
        config
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());

        assert_eq!(server.config.port, 7777);
        assert_eq!(server.hub().subscriber_count(), 0);
    }

    #[test]
    fn serves_from_given_output() {
        let server = DevServer::new(DevServerConfig {
            port: 9000,
            open: false,
            ..Default::default()
        });

        let config = server.server_config(Path::new("/tmp/gcare-dev-x"));

        assert_eq!(config.output_dir, PathBuf::from("/tmp/gcare-dev-x"));
        assert_eq!(config.port, 9000);
        assert!(!config.open);
    }

    #[tokio::test]
    async fn dev_build_stays_out_of_site_output() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        let output = dev_output().unwrap();
        let output_dir = output.path().to_path_buf();

        assert!(!output_dir.starts_with(temp.path()));

        build_site(&config, &output_dir, 7777).await.unwrap();

        assert!(output_dir.join("terms").join("index.html").exists());
        assert!(!temp.path().join("dist").exists());

        drop(output);
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn dev_build_includes_live_client_and_local_links() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        let out = temp.path().join("dev");

        let result = build_site(&config, &out, 7777).await.unwrap();

        assert_eq!(result.pages, 1);
        let html = fs::read_to_string(out.join("terms").join("index.html")).unwrap();
        assert!(html.contains("__live.js"));
        assert!(html.contains("subdomain=privacy"));
    }

    #[tokio::test]
    async fn rebuild_broadcasts_reload() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        let out = temp.path().join("dev");
        let hub = LiveHub::new();
        let mut rx = hub.subscribe();

        fs::write(
            temp.path().join("docs").join("terms.md"),
            "## Scope\n## Changes",
        )
        .unwrap();
        handle_watch_event(
            &config,
            &out,
            7777,
            &hub,
            WatchEvent::DocumentChanged(temp.path().join("docs").join("terms.md")),
        )
        .await;

        assert_eq!(rx.try_recv().unwrap(), LiveMessage::Reload);
        let html = fs::read_to_string(out.join("terms").join("index.html")).unwrap();
        assert!(html.contains(r#"id="changes""#));
    }

    #[tokio::test]
    async fn failed_rebuild_reports_error() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("site.toml");
        fs::write(&config, "[site\n").unwrap();
        let hub = LiveHub::new();
        let mut rx = hub.subscribe();

        handle_watch_event(
            &config,
            &temp.path().join("dev"),
            7777,
            &hub,
            WatchEvent::ConfigChanged(config.clone()),
        )
        .await;

        assert!(matches!(
            rx.try_recv().unwrap(),
            LiveMessage::BuildFailed { .. }
        ));
    }
}
