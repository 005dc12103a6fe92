//! Plugin registry - Holds the current handler snapshot

use std::sync::{Arc, RwLock};

use crate::application::errors::PluginError;
use crate::domain::traits::{CommandHandler, PluginLoader};
use crate::infrastructure::config::RunMode;

/// Immutable, ordered handler set shared with in-flight dispatches
pub type Snapshot = Arc<[Arc<dyn CommandHandler>]>;

/// Registry whose snapshot is replaced wholesale on reload.
///
/// Readers clone the `Arc` once per dispatch and never observe a partial set.
pub struct PluginRegistry {
    current: RwLock<Snapshot>,
    loader: Arc<dyn PluginLoader>,
}

impl PluginRegistry {
    pub fn new(loader: Arc<dyn PluginLoader>) -> Self {
        Self {
            current: RwLock::new(Arc::from(Vec::new())),
            loader,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Publish a new snapshot
    pub fn replace(&self, handlers: Vec<Arc<dyn CommandHandler>>) {
        let snapshot: Snapshot = Arc::from(handlers);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
    }

    /// Load a fresh handler set and publish it.
    ///
    /// On failure the previous snapshot stays active.
    pub async fn reload(&self) -> Result<usize, PluginError> {
        match self.loader.load().await {
            Ok(handlers) => {
                let count = handlers.len();
                self.replace(handlers);
                tracing::info!("Loaded {} plugins", count);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Failed to load plugins, keeping previous set: {}", e);
                Err(e)
            }
        }
    }

    /// Startup load. A failure is fatal in production; in development the
    /// bot starts with an empty registry and waits for the hot reloader.
    pub async fn initial_load(&self, mode: RunMode) -> Result<usize, PluginError> {
        match self.reload().await {
            Ok(count) => Ok(count),
            Err(e) if mode == RunMode::Production => Err(e),
            Err(e) => {
                tracing::warn!("Failed to load plugins: {}, continuing without them", e);
                Ok(0)
            }
        }
    }

    /// All command aliases in registry order
    pub fn commands(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .flat_map(|h| h.spec().aliases.iter().cloned())
            .collect()
    }

    /// Get the number of loaded plugins
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Check if no plugins are loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
