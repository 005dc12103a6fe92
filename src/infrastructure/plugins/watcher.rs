//! Development-mode hot reload of the plugin directory

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::PluginError;
use super::loader::is_manifest_path;
use super::registry::PluginRegistry;

/// Watches the plugin directory and reloads the registry on manifest changes.
///
/// Dropping the reloader stops the watcher; the reload task then drains and exits.
pub struct HotReloader {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl HotReloader {
    /// Start watching `plugin_dir`. Must be called inside a tokio runtime.
    pub fn start(plugin_dir: &Path, registry: Arc<PluginRegistry>) -> Result<Self, PluginError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) if is_change(&event.kind) => {
                    for path in event.paths {
                        if is_manifest_path(&path) {
                            let _ = tx.send(path);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Plugin watcher error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| PluginError::Watch(format!("failed to create watcher: {}", e)))?;

        watcher
            .watch(plugin_dir, RecursiveMode::NonRecursive)
            .map_err(|e| PluginError::Watch(format!("failed to watch {}: {}", plugin_dir.display(), e)))?;

        let task = tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                // Editors emit bursts of events for one save
                while rx.try_recv().is_ok() {}

                tracing::info!("File changed: {}", path.display());
                // Failures are logged by the registry; the old snapshot stays active
                let _ = registry.reload().await;
            }
        });

        tracing::info!(path = %plugin_dir.display(), "Hot reload active in development mode");

        Ok(Self {
            _watcher: watcher,
            task,
        })
    }

    /// Stop watching and abort the reload task
    pub fn stop(self) {
        self.task.abort();
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}
