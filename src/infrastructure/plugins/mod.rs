//! Plugin system
//!
//! Plugins are YAML manifests that declare command aliases, access requirements
//! and the compiled-in handler they bind to. The registry keeps the current
//! snapshot; in development mode the watcher reloads it when manifests change.

pub mod builtin;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod watcher;

pub use builtin::HandlerFactory;
pub use loader::ManifestLoader;
pub use manifest::PluginManifest;
pub use registry::{PluginRegistry, Snapshot};
pub use watcher::HotReloader;
