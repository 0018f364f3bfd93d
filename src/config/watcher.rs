//! Hot reload of the configuration file.
//!
//! The injector usually runs with its config mounted from a ConfigMap. The
//! kubelet updates such mounts by writing a new `..data_<timestamp>`
//! directory and swapping the `..data` symlink, so the config path itself
//! never sees a write. Editors and deploy tools replace files by renaming a
//! temporary file over them, which a watch on the file's inode also misses.
//!
//! The watcher therefore observes the parent directory, keeps events that
//! touch the config file name or a `..`-prefixed mount entry, and reloads
//! only when the file's content actually changed.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::InjectorConfig;

/// Poll interval for backends that cannot subscribe to changes.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Prefix of the entries a ConfigMap volume swaps atomically.
const MOUNT_ENTRY_PREFIX: &str = "..";

/// Watches the config file and sends each new valid configuration.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<InjectorConfig>,
}

impl ConfigWatcher {
    /// Create a watcher and the receiver its updates arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<InjectorConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watch_dir(&self.path);
        let file_name = self.path.file_name().map(OsStr::to_os_string);
        let mut reloader = Reloader::new(self.path.clone(), self.update_tx);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant(&event, file_name.as_deref()) => reloader.reload(),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Directory holding `path`; `.` for a bare file name.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether an event in the watched directory may have changed the config.
fn is_relevant(event: &Event, file_name: Option<&OsStr>) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.iter().any(|path| match path.file_name() {
        Some(name) => Some(name) == file_name || name.to_string_lossy().starts_with(MOUNT_ENTRY_PREFIX),
        None => false,
    })
}

/// Re-reads the config and forwards it when the content changed.
struct Reloader {
    path: PathBuf,
    last_seen: Option<String>,
    tx: mpsc::UnboundedSender<InjectorConfig>,
}

impl Reloader {
    fn new(path: PathBuf, tx: mpsc::UnboundedSender<InjectorConfig>) -> Self {
        let last_seen = fs::read_to_string(&path).ok();
        Self { path, last_seen, tx }
    }

    fn reload(&mut self) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                // Mid-swap the path can briefly dangle; the next event retries.
                tracing::debug!(path = ?self.path, error = %e, "Config file not readable yet");
                return;
            }
        };
        if self.last_seen.as_deref() == Some(content.as_str()) {
            tracing::trace!(path = ?self.path, "Config content unchanged");
            return;
        }

        tracing::info!(path = ?self.path, "Config file change detected, reloading");
        match parse_config(&content) {
            Ok(config) => {
                if self.tx.send(config).is_err() {
                    tracing::debug!("Config receiver dropped");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
        self.last_seen = Some(content);
    }
}
