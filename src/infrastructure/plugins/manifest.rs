//! Plugin manifest definition

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::errors::PluginError;
use crate::domain::entities::CommandSpec;

/// One plugin as declared in a YAML manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginManifest {
    /// Plugin name (required)
    pub name: String,

    /// Plugin description
    #[serde(default)]
    pub description: Option<String>,

    /// Command aliases this plugin answers to
    pub commands: Vec<String>,

    #[serde(default)]
    pub only_premium: bool,

    #[serde(default)]
    pub only_owner: bool,

    /// Usage limit consumed per invocation
    #[serde(default)]
    pub limit_deduction: Option<u32>,

    /// Name of the handler implementation the manifest binds to
    pub handler: String,

    /// Reply text for handlers that send one
    #[serde(default)]
    pub reply: Option<String>,

    /// Halt the dispatch after this plugin ran
    #[serde(default)]
    pub stop: bool,
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Load(format!("Failed to read manifest {}: {}", path.display(), e)))?;

        Self::from_yaml(&content)
            .map_err(|e| PluginError::Load(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self, PluginError> {
        serde_yaml::from_str(content)
            .map_err(|e| PluginError::Load(format!("Failed to parse manifest: {}", e)))
    }

    /// Capability record for the dispatcher, validated
    pub fn spec(&self) -> Result<CommandSpec, PluginError> {
        let spec = CommandSpec {
            name: self.name.clone(),
            aliases: self.commands.clone(),
            only_premium: self.only_premium,
            only_owner: self.only_owner,
            quota_cost: self.limit_deduction,
        };
        spec.validate()?;
        Ok(spec)
    }
}
