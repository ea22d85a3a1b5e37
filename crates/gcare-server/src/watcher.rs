//! File watching for dev rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A markdown document was created or modified
    DocumentChanged(PathBuf),

    /// A markdown document was deleted
    DocumentRemoved(PathBuf),

    /// The site configuration changed
    ConfigChanged(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::DocumentChanged(p) | Self::DocumentRemoved(p) | Self::ConfigChanged(p) => p,
        }
    }
}

/// File watcher for the docs directory and the config file.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `docs_dir` recursively and `config_path`.
    ///
    /// Returns the watcher and a channel to receive events. The config file's
    /// directory is watched rather than the file so editors that replace the
    /// file on save are still seen.
    pub fn new(
        docs_dir: &Path,
        config_path: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        if docs_dir.exists() {
            watcher
                .watch(docs_dir, RecursiveMode::Recursive)
                .map_err(std::io::Error::other)?;
        }

        let config_dir = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if config_dir.exists() {
            watcher
                .watch(&config_dir, RecursiveMode::NonRecursive)
                .map_err(std::io::Error::other)?;
        }

        let config_name = config_path.file_name().map(|n| n.to_os_string());

        std::thread::spawn(move || {
            let mut last_event_time = std::time::Instant::now();
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // Debounce rapid events
                let now = std::time::Instant::now();
                if now.duration_since(last_event_time) < debounce_duration {
                    continue;
                }

                let mut sent = false;
                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind, config_name.as_deref()) {
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                        sent = true;
                    }
                }
                if sent {
                    last_event_time = now;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(
    path: &Path,
    kind: &notify::EventKind,
    config_name: Option<&std::ffi::OsStr>,
) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    if config_name.is_some() && path.file_name() == config_name {
        return Some(WatchEvent::ConfigChanged(path.to_path_buf()));
    }

    if path.extension().and_then(|e| e.to_str()) != Some("md") {
        return None;
    }

    match kind {
        EventKind::Remove(_) => Some(WatchEvent::DocumentRemoved(path.to_path_buf())),
        _ => Some(WatchEvent::DocumentChanged(path.to_path_buf())),
    }
}
