//! Controller configuration watcher for `watch` mode.
//!
//! The parent directory is watched rather than the file itself so that
//! editors replacing the file by rename keep triggering reloads. Only events
//! naming the config file are acted on.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ControllerConfig;

/// Watches the controller config file and sends every config that loads and
/// validates.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ControllerConfig>,
}

/// Result of one reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reload {
    Sent,
    Rejected,
    /// Nobody is listening any more.
    Closed,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ControllerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Starts watching. Keep the returned watcher alive for as long as
    /// reloads are wanted; once the receiver is dropped, events are ignored.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let ConfigWatcher { path, update_tx } = self;
        let directory = watched_directory(&path);
        let file_name = path.file_name().map(OsStr::to_os_string);
        let config_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if names_file(&event, file_name.as_deref()) => {
                    if reload(&config_path, &update_tx) == Reload::Closed {
                        tracing::debug!(
                            path = ?config_path,
                            "Config receiver dropped, ignoring change"
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default(),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Watching controller config");
        Ok(watcher)
    }
}

fn watched_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True for a create or modify event on the config file.
fn names_file(event: &Event, file_name: Option<&OsStr>) -> bool {
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return false;
    }
    let Some(file_name) = file_name else {
        return false;
    };
    event.paths.iter().any(|path| path.file_name() == Some(file_name))
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<ControllerConfig>) -> Reload {
    if tx.is_closed() {
        return Reload::Closed;
    }

    match load_config(path) {
        Ok(config) => match tx.send(config) {
            Ok(()) => {
                tracing::info!(path = ?path, "Controller config reloaded");
                Reload::Sent
            }
            Err(_) => Reload::Closed,
        },
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                tracing::error!(
                    path = ?path,
                    field = error.field,
                    "Rejected config reload: {}",
                    error.message
                );
            }
            Reload::Rejected
        }
        Err(e) => {
            tracing::error!(
                path = ?path,
                error = %e,
                "Failed to reload config, keeping current one"
            );
            Reload::Rejected
        }
    }
}
