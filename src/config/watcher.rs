//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by rename are still seen. Bursts of events are
//! collapsed into one reload, and a reload that yields the config already
//! in effect is not forwarded.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_config;
use crate::config::schema::RelayConfig;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches one config file and emits each validated, changed config.
pub struct ConfigWatcher {
    path: PathBuf,
    current: RelayConfig,
    debounce: Duration,
}

/// Keeps the OS watcher and the reload task alive. Dropping it stops both.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ConfigWatcher {
    /// `current` is the config in effect; reloads equal to it are dropped.
    pub fn new(path: &Path, current: RelayConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            current,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. Must be called from within a Tokio runtime.
    pub fn spawn(self) -> Result<(WatchHandle, mpsc::UnboundedReceiver<RelayConfig>), notify::Error> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &file_name) => {
                    let _ = tick_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");

        let task = tokio::spawn(reload_loop(
            self.path,
            self.current,
            self.debounce,
            tick_rx,
            update_tx,
        ));

        Ok((
            WatchHandle {
                _watcher: watcher,
                task,
            },
            update_rx,
        ))
    }
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Reload once per burst of ticks and forward configs that differ from the
/// last one sent.
async fn reload_loop(
    path: PathBuf,
    mut current: RelayConfig,
    debounce: Duration,
    mut ticks: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<RelayConfig>,
) {
    while ticks.recv().await.is_some() {
        tokio::time::sleep(debounce).await;
        while ticks.try_recv().is_ok() {}

        match load_config(&path) {
            Ok(config) if config == current => {
                tracing::debug!("Config file unchanged, skipping reload");
            }
            Ok(config) => {
                tracing::info!("Config file change detected, reloading");
                current = config.clone();
                if updates.send(config).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current settings");
            }
        }
    }
}
