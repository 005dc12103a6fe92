//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;
use crate::domain::entities::message::sender_number;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub mode: RunMode,
    pub rate_limit_ms: u64,
    pub bot_destination: BotDestination,
    pub command_similarity: bool,
    pub rate_ledger_capacity: usize,
    pub plugins: PluginConfig,
    pub registration: RegistrationConfig,
    pub storage: StorageConfig,
    pub incidents: IncidentConfig,
    pub messages: MessagesConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefixes: Vec<String>,
    /// Owner numbers, without the network suffix
    pub owners: Vec<String>,
}

/// Runtime mode; hot reload is only active in development
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

/// Which conversation kinds the bot answers (owners are always answered)
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum BotDestination {
    Private,
    Group,
    #[default]
    Both,
}

impl From<String> for BotDestination {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "private" => BotDestination::Private,
            "group" => BotDestination::Group,
            _ => BotDestination::Both,
        }
    }
}

impl From<BotDestination> for String {
    fn from(value: BotDestination) -> Self {
        match value {
            BotDestination::Private => "private",
            BotDestination::Group => "group",
            BotDestination::Both => "both",
        }
        .to_string()
    }
}

impl BotDestination {
    pub fn allows(&self, is_group: bool) -> bool {
        match self {
            BotDestination::Private => !is_group,
            BotDestination::Group => is_group,
            BotDestination::Both => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RegistrationConfig {
    pub required: bool,
    /// Commands usable before registering
    pub exempt_commands: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
    /// Usage limit seeded for the console user
    pub default_limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IncidentConfig {
    pub directory: PathBuf,
}

/// User-facing reply texts
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MessagesConfig {
    pub not_premium: String,
    pub not_owner: String,
    pub limit_exhausted: String,
    pub not_registered: String,
    /// Template with `{command}`, `{prefix}` and `{suggestion}` placeholders
    pub command_not_found: String,
}

impl MessagesConfig {
    pub fn command_not_found(&self, command: &str, prefix: &str, suggestion: &str) -> String {
        self.command_not_found
            .replace("{command}", command)
            .replace("{prefix}", prefix)
            .replace("{suggestion}", suggestion)
    }
}

/// Identity used by the console adapter
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConsoleConfig {
    pub sender: String,
    pub display_name: String,
    pub group: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            mode: RunMode::Production,
            rate_limit_ms: 3000,
            bot_destination: BotDestination::Both,
            command_similarity: true,
            rate_ledger_capacity: 10_000,
            plugins: PluginConfig::default(),
            registration: RegistrationConfig::default(),
            storage: StorageConfig::default(),
            incidents: IncidentConfig::default(),
            messages: MessagesConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "chatgate".to_string(),
            prefixes: vec![".".to_string(), "!".to_string(), "/".to_string()],
            owners: Vec::new(),
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./plugins"),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            required: false,
            exempt_commands: ["list", "owner", "menu", "claim"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: PathBuf::from("chatgate.db"),
            default_limit: 20,
        }
    }
}

impl Default for IncidentConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            not_premium: "_This command is only available to premium users._".to_string(),
            not_owner: "_This command is only available to the bot owner._".to_string(),
            limit_exhausted: "_Your usage limit has run out._".to_string(),
            not_registered: "_Please register before using this command._".to_string(),
            command_not_found: "_Command *{command}* not found_ \n\n_Did you mean *{prefix}{suggestion}*?_"
                .to_string(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            sender: "console@s.whatsapp.net".to_string(),
            display_name: "console".to_string(),
            group: false,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(mode) = std::env::var("BOT_MODE") {
            match mode.to_lowercase().as_str() {
                "development" => self.mode = RunMode::Development,
                "production" => self.mode = RunMode::Production,
                other => tracing::warn!("Ignoring unknown BOT_MODE: {}", other),
            }
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefixes = prefix.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect();
        }

        if let Ok(ms) = std::env::var("RATE_LIMIT_MS") {
            match ms.parse() {
                Ok(ms) => self.rate_limit_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid RATE_LIMIT_MS: {}", ms),
            }
        }

        if let Ok(owners) = std::env::var("BOT_OWNERS") {
            self.bot.owners = owners.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefixes.is_empty() {
            return Err(ConfigError::MissingField("bot.prefixes".to_string()));
        }
        if self.bot.prefixes.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidValue("bot.prefixes must not contain empty prefixes".to_string()));
        }
        if self.rate_ledger_capacity == 0 {
            return Err(ConfigError::InvalidValue("rate-ledger-capacity must be positive".to_string()));
        }
        Ok(())
    }

    /// Check if a sender is one of the configured owners
    pub fn is_owner(&self, sender: &str) -> bool {
        let number = sender_number(sender);
        self.bot.owners.iter().any(|o| o == number)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn hot_reload_enabled(&self) -> bool {
        self.mode == RunMode::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("mode: development\nrate-limit-ms: 500\n").unwrap();
        assert_eq!(config.mode, RunMode::Development);
        assert_eq!(config.rate_limit(), Duration::from_millis(500));
        assert!(config.command_similarity);
        assert_eq!(config.registration.exempt_commands, vec!["list", "owner", "menu", "claim"]);
    }

    #[test]
    fn test_destination_parsing() {
        let config = Config::from_yaml("bot-destination: Group\n").unwrap();
        assert_eq!(config.bot_destination, BotDestination::Group);
        let config = Config::from_yaml("bot-destination: everywhere\n").unwrap();
        assert_eq!(config.bot_destination, BotDestination::Both);
    }

    #[test]
    fn test_destination_allows() {
        assert!(BotDestination::Private.allows(false));
        assert!(!BotDestination::Private.allows(true));
        assert!(BotDestination::Group.allows(true));
        assert!(!BotDestination::Group.allows(false));
        assert!(BotDestination::Both.allows(true));
    }

    #[test]
    fn test_is_owner_ignores_suffix() {
        let mut config = Config::default();
        config.bot.owners = vec!["628123".to_string()];
        assert!(config.is_owner("628123@s.whatsapp.net"));
        assert!(config.is_owner("628123"));
        assert!(!config.is_owner("628999@s.whatsapp.net"));
    }

    #[test]
    fn test_rejects_empty_prefixes() {
        assert!(Config::from_yaml("bot:\n  prefixes: []\n").is_err());
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = Config::default().to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.bot.prefixes, Config::default().bot.prefixes);
        assert_eq!(parsed.bot_destination, BotDestination::Both);
    }

    #[test]
    fn test_not_found_template() {
        let messages = MessagesConfig::default();
        let text = messages.command_not_found("pign", ".", "ping");
        assert!(text.contains("*pign*"));
        assert!(text.contains("*.ping*"));
    }
}
