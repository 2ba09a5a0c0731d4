use histmon_core::Result;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::HistmonConfig;

/// Watches the config file and re-parses it on every write.
///
/// Only configs that load and validate are forwarded; a broken edit is
/// logged and the previous settings stay in force.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use histmon_config::ConfigWatcher;
/// let (_, mut rx) = ConfigWatcher::spawn("/home/user/.config/histmon/histmon.toml");
/// while let Some(config) = rx.recv().await {
///     println!("retention is now {:?}", config.history.retention());
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver yielding each reloaded config.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<HistmonConfig>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn reload(path: &Path) -> Result<HistmonConfig> {
    let raw = std::fs::read_to_string(path)?;
    crate::parse(&raw)
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<HistmonConfig>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", path.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Watcher error: {e}");
                continue;
            }
        };

        use notify::EventKind::*;
        if !matches!(event.kind, Modify(_) | Create(_)) {
            continue;
        }

        match reload(&path) {
            Ok(config) => {
                debug!(?config, "config reloaded");
                if tx.send(config).await.is_err() {
                    break; // receiver dropped
                }
            }
            Err(e) => warn!("Ignoring config change: {e}"),
        }
    }
}
