//! Asynchronous document loading.
//!
//! A [`DocumentLoader`] publishes its state through a watch channel. Every
//! call to [`DocumentLoader::load`] starts a new generation; a fetch that
//! resolves after a newer load has started is discarded, so out-of-order
//! responses can never overwrite the current document.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use ureq::Agent;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 15;

/// Errors that can occur when fetching a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Document {0} is not UTF-8 text")]
    NotText(String),

    #[error("Fetch task failed: {0}")]
    Task(String),
}

/// Where documents come from.
pub trait DocumentSource: Send + Sync + 'static {
    /// Fetch the text of the document at `path`.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Documents read from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a route-relative path inside the root.
    ///
    /// Absolute components and `..` are rejected so a path can never leave the
    /// root directory.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(path.trim_start_matches('/'));

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(LoadError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl DocumentSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        let file = self.resolve(path)?;

        let bytes = tokio::fs::read(&file).await.map_err(|e| LoadError::Io {
            path: file.display().to_string(),
            message: e.to_string(),
        })?;

        String::from_utf8(bytes).map_err(|_| LoadError::NotText(path.to_string()))
    }
}

/// Documents fetched with an HTTP GET relative to a base URL.
#[derive(Clone)]
pub struct HttpSource {
    agent: Agent,
    base_url: String,
}

impl HttpSource {
    /// Create a source with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Absolute URL for a document path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        let agent = self.agent.clone();
        let url = self.url_for(path);

        tokio::task::spawn_blocking(move || {
            let response = agent.get(&url).call().map_err(|e| LoadError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;

            let status = response.status().as_u16();
            if status >= 400 {
                return Err(LoadError::Status { url, status });
            }

            response
                .into_body()
                .read_to_string()
                .map_err(|e| LoadError::Http {
                    url: url.clone(),
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| LoadError::Task(e.to_string()))?
    }
}

/// A loaded document. Immutable; a new path yields a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub text: Arc<str>,
}

impl Document {
    /// Wrap fetched text, dropping a leading byte order mark.
    pub fn new(path: impl Into<String>, text: &str) -> Self {
        Self {
            path: path.into(),
            text: Arc::from(text.strip_prefix('\u{feff}').unwrap_or(text)),
        }
    }
}

/// Observable loader state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    /// Generation of the most recent load
    pub generation: u64,

    /// Path of the most recent load
    pub path: Option<String>,

    /// Whether the most recent load is still in flight
    pub loading: bool,

    /// Current document, if the most recent load succeeded
    pub document: Option<Document>,

    /// User-visible message when the most recent load failed
    pub error: Option<String>,
}

/// Result of a single [`DocumentLoader::load`] call.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Document),
    Failed(LoadError),
    /// A newer load started before this one resolved; its result was dropped
    Superseded,
}

/// Loads documents from a source, keeping only the latest result.
pub struct DocumentLoader<S> {
    source: S,
    state: watch::Sender<LoadState>,
}

impl<S: DocumentSource> DocumentLoader<S> {
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self { source, state }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Start loading `path`.
    ///
    /// The loading flag is raised and the previous document cleared as soon
    /// as this is called, before the returned future is polled.
    pub fn load(&self, path: &str) -> impl Future<Output = LoadOutcome> + Send + '_ {
        let path = path.to_string();
        let mut generation = 0;

        self.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.path = Some(path.clone());
            state.loading = true;
            state.document = None;
            state.error = None;
        });

        async move {
            let result = self.source.fetch(&path).await;
            let mut outcome = LoadOutcome::Superseded;

            self.state.send_if_modified(|state| {
                if state.generation != generation {
                    return false;
                }

                state.loading = false;
                match result {
                    Ok(text) => {
                        let document = Document::new(path.clone(), &text);
                        state.document = Some(document.clone());
                        outcome = LoadOutcome::Loaded(document);
                    }
                    Err(e) => {
                        tracing::error!("Error loading markdown {}: {}", path, e);
                        state.error = Some(format!("This document could not be loaded ({e})."));
                        outcome = LoadOutcome::Failed(e);
                    }
                }
                true
            });

            if matches!(outcome, LoadOutcome::Superseded) {
                tracing::debug!(
                    "Discarded stale result for {} (generation {})",
                    path,
                    generation
                );
            }

            outcome
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    /// In-memory source with a per-path delay.
    pub(crate) struct StaticSource {
        docs: HashMap<String, (Duration, Option<String>)>,
    }

    impl StaticSource {
        pub(crate) fn new() -> Self {
            Self {
                docs: HashMap::new(),
            }
        }

        pub(crate) fn with(mut self, path: &str, delay_ms: u64, text: Option<&str>) -> Self {
            self.docs.insert(
                path.to_string(),
                (Duration::from_millis(delay_ms), text.map(str::to_string)),
            );
            self
        }
    }

    impl DocumentSource for StaticSource {
        async fn fetch(&self, path: &str) -> Result<String, LoadError> {
            let Some((delay, text)) = self.docs.get(path) else {
                return Err(LoadError::Status {
                    url: path.to_string(),
                    status: 404,
                });
            };
            tokio::time::sleep(*delay).await;
            text.clone().ok_or_else(|| LoadError::Http {
                url: path.to_string(),
                message: "connection reset".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn loads_document() {
        let loader = DocumentLoader::new(StaticSource::new().with("/terms.md", 0, Some("# Terms")));

        let outcome = loader.load("/terms.md").await;

        assert!(matches!(outcome, LoadOutcome::Loaded(ref d) if &*d.text == "# Terms"));
        let state = loader.snapshot();
        assert!(!state.loading);
        assert_eq!(
            state.document.map(|d| d.path),
            Some("/terms.md".to_string())
        );
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn strips_byte_order_mark() {
        let loader = DocumentLoader::new(StaticSource::new().with(
            "/bom.md",
            0,
            Some("\u{feff}## First\n## Second"),
        ));

        let LoadOutcome::Loaded(document) = loader.load("/bom.md").await else {
            panic!("expected a loaded document");
        };

        assert_eq!(&*document.text, "## First\n## Second");
    }

    #[tokio::test]
    async fn raises_loading_flag_before_polling() {
        let loader = DocumentLoader::new(StaticSource::new().with("/a.md", 0, Some("a")));

        let pending = loader.load("/a.md");
        assert!(loader.snapshot().loading);

        pending.await;
        assert!(!loader.snapshot().loading);
    }

    #[tokio::test]
    async fn failure_clears_loading_and_keeps_content_empty() {
        let loader = DocumentLoader::new(StaticSource::new().with("/down.md", 0, None));

        let outcome = loader.load("/down.md").await;

        assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Http { .. })));
        let state = loader.snapshot();
        assert!(!state.loading);
        assert!(state.document.is_none());
        assert!(state.error.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn stale_result_never_overwrites_newer_load() {
        let loader = DocumentLoader::new(
            StaticSource::new()
                .with("/slow.md", 80, Some("slow"))
                .with("/fast.md", 0, Some("fast")),
        );

        let slow = loader.load("/slow.md");
        let fast = loader.load("/fast.md");
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(matches!(slow, LoadOutcome::Superseded));
        assert!(matches!(fast, LoadOutcome::Loaded(_)));
        let state = loader.snapshot();
        assert_eq!(state.generation, 2);
        assert_eq!(
            state.document.map(|d| d.text.to_string()),
            Some("fast".to_string())
        );
    }

    #[tokio::test]
    async fn stale_failure_does_not_set_error() {
        let loader = DocumentLoader::new(
            StaticSource::new()
                .with("/broken.md", 50, None)
                .with("/ok.md", 0, Some("ok")),
        );

        let broken = loader.load("/broken.md");
        let ok = loader.load("/ok.md");
        tokio::join!(broken, ok);

        assert_eq!(loader.snapshot().error, None);
    }

    #[tokio::test]
    async fn subscribers_see_published_document() {
        let loader = DocumentLoader::new(StaticSource::new().with("/p.md", 0, Some("privacy")));
        let mut rx = loader.subscribe();

        loader.load("/p.md").await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().document.is_some());
    }

    #[tokio::test]
    async fn fs_source_reads_within_root() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("terms.md"), "## Scope").unwrap();
        let source = FsSource::new(temp.path());

        assert_eq!(source.fetch("/terms.md").await.unwrap(), "## Scope");
        assert!(matches!(
            source.fetch("/missing.md").await,
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn fs_source_rejects_escaping_paths() {
        let source = FsSource::new("/srv/docs");

        for path in ["../etc/passwd", "/a/../../b", "/"] {
            assert!(matches!(source.resolve(path), Err(LoadError::InvalidPath(_))));
        }
        assert_eq!(
            source.resolve("/legal/terms.md").unwrap(),
            PathBuf::from("/srv/docs/legal/terms.md")
        );
    }

    #[tokio::test]
    async fn fs_source_rejects_binary() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("logo.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = FsSource::new(temp.path()).fetch("logo.md").await;

        assert!(matches!(result, Err(LoadError::NotText(_))));
    }

    #[test]
    fn http_source_builds_urls() {
        let source = HttpSource::new("https://terms.jrmsu-gcare.com/");

        assert_eq!(
            source.url_for("/terms.md"),
            "https://terms.jrmsu-gcare.com/terms.md"
        );
        assert_eq!(
            source.url_for("docs/a.md"),
            "https://terms.jrmsu-gcare.com/docs/a.md"
        );
    }
}
