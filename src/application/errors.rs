//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Plugin loading and execution errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Invalid plugin '{name}': {reason}")]
    Invalid { name: String, reason: String },

    #[error("Unknown handler '{handler}' in plugin '{plugin}'")]
    UnknownHandler { plugin: String, handler: String },

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Execution failed: {0}")]
    Execution(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
