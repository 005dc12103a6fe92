//! Plugin loader - Builds handlers from the manifests in the plugin directory

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::PluginError;
use crate::domain::traits::{CommandHandler, PluginLoader};
use super::builtin::HandlerFactory;
use super::manifest::PluginManifest;

/// Loads every manifest in a directory; one malformed manifest fails the whole load
pub struct ManifestLoader {
    plugin_dir: PathBuf,
    factory: HandlerFactory,
}

impl ManifestLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>, factory: HandlerFactory) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            factory,
        }
    }
}

#[async_trait]
impl PluginLoader for ManifestLoader {
    async fn load(&self) -> Result<Vec<Arc<dyn CommandHandler>>, PluginError> {
        // File reads and YAML parsing stay off the async workers
        let plugin_dir = self.plugin_dir.clone();
        let factory = self.factory.clone();
        tokio::task::spawn_blocking(move || load_dir(&plugin_dir, &factory))
            .await
            .map_err(|e| PluginError::Load(format!("Plugin load task failed: {}", e)))?
    }
}

fn load_dir(plugin_dir: &Path, factory: &HandlerFactory) -> Result<Vec<Arc<dyn CommandHandler>>, PluginError> {
    let mut handlers = Vec::new();

    if !plugin_dir.exists() {
        tracing::warn!("Plugin directory does not exist: {}", plugin_dir.display());
        return Ok(handlers);
    }

    let mut names = HashSet::new();
    for path in manifest_paths(plugin_dir)? {
        let manifest = PluginManifest::from_file(&path)?;
        if !names.insert(manifest.name.clone()) {
            return Err(PluginError::Invalid {
                name: manifest.name,
                reason: format!("duplicate plugin name in {}", path.display()),
            });
        }

        let handler = factory.build(&manifest)?;
        tracing::debug!(
            plugin = %manifest.name,
            commands = ?manifest.commands,
            "Loaded plugin manifest"
        );
        handlers.push(handler);
    }

    Ok(handlers)
}

/// Manifest files in load order (sorted by file name)
fn manifest_paths(plugin_dir: &Path) -> Result<Vec<PathBuf>, PluginError> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(plugin_dir)
        .map_err(|e| PluginError::Load(format!("Failed to read plugin directory: {}", e)))?
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && is_manifest_path(&path) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

/// Visible `.yaml` / `.yml` files
pub fn is_manifest_path(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    !hidden && yaml
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_is_manifest_path() {
        assert!(is_manifest_path(Path::new("plugins/ping.yaml")));
        assert!(is_manifest_path(Path::new("plugins/ping.yml")));
        assert!(!is_manifest_path(Path::new("plugins/.ping.yaml")));
        assert!(!is_manifest_path(Path::new("plugins/ping.yaml.swp")));
        assert!(!is_manifest_path(Path::new("plugins/readme.md")));
    }

    #[tokio::test]
    async fn test_loads_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.yaml", "name: second\ncommands: [b]\nhandler: echo\n");
        write(dir.path(), "a.yml", "name: first\ncommands: [a]\nhandler: ping\n");
        write(dir.path(), ".hidden.yaml", "not: [valid");
        write(dir.path(), "notes.txt", "ignored");

        let loader = ManifestLoader::new(dir.path(), HandlerFactory::with_builtins());
        let handlers = loader.load().await.unwrap();
        let names: Vec<&str> = handlers.iter().map(|h| h.spec().name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_malformed_manifest_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.yaml", "name: ok\ncommands: [a]\nhandler: echo\n");
        write(dir.path(), "b.yaml", "name: broken\ncommands: [b\n");

        let loader = ManifestLoader::new(dir.path(), HandlerFactory::with_builtins());
        assert!(matches!(loader.load().await, Err(PluginError::Load(_))));
    }

    #[tokio::test]
    async fn test_duplicate_names_fail_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.yaml", "name: same\ncommands: [a]\nhandler: echo\n");
        write(dir.path(), "b.yaml", "name: same\ncommands: [b]\nhandler: echo\n");

        let loader = ManifestLoader::new(dir.path(), HandlerFactory::with_builtins());
        assert!(matches!(loader.load().await, Err(PluginError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_cased_alias_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "p.yaml", "name: ping\ncommands: [Ping]\nhandler: ping\n");

        let loader = ManifestLoader::new(dir.path(), HandlerFactory::with_builtins());
        assert!(matches!(loader.load().await, Err(PluginError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_missing_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ManifestLoader::new(dir.path().join("absent"), HandlerFactory::with_builtins());
        assert!(loader.load().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_load_leaves_the_runtime_responsive() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..50 {
            write(dir.path(), &format!("p{:02}.yaml", i), &format!("name: p{i}\ncommands: [c{i}]\nhandler: echo\n"));
        }
        let loader = ManifestLoader::new(dir.path(), HandlerFactory::with_builtins());

        // Both loads and the ticker share one worker thread
        let ticker = tokio::spawn(async { tokio::task::yield_now().await });
        let (a, b) = tokio::join!(loader.load(), loader.load());

        assert_eq!(a.unwrap().len(), 50);
        assert_eq!(b.unwrap().len(), 50);
        ticker.await.unwrap();
    }
}
