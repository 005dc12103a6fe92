use crate::application::errors::PluginError;

/// Declared capabilities of a command handler: aliases plus access and quota requirements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub only_premium: bool,
    pub only_owner: bool,
    pub quota_cost: Option<u32>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            only_premium: false,
            only_owner: false,
            quota_cost: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn premium_only(mut self) -> Self {
        self.only_premium = true;
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.only_owner = true;
        self
    }

    pub fn with_quota_cost(mut self, cost: u32) -> Self {
        self.quota_cost = Some(cost);
        self
    }

    /// Exact, case-sensitive alias match.
    pub fn matches(&self, command: &str) -> bool {
        self.aliases.iter().any(|a| a == command)
    }

    /// Reject specs that could never dispatch correctly.
    pub fn validate(&self) -> Result<(), PluginError> {
        let invalid = |reason: &str| PluginError::Invalid {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.aliases.is_empty() {
            return Err(invalid("at least one command alias is required"));
        }
        for alias in &self.aliases {
            if alias.is_empty() || alias.chars().any(char::is_whitespace) {
                return Err(invalid(&format!("invalid command alias '{}'", alias)));
            }
            // Parsed commands are lowercased, so a cased alias could never match
            if alias.chars().any(char::is_uppercase) {
                return Err(invalid(&format!("command alias '{}' must be lowercase", alias)));
            }
        }
        if self.quota_cost == Some(0) {
            return Err(invalid("limit deduction must be a positive integer"));
        }
        Ok(())
    }
}

/// What a handler asks the dispatcher to do after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginOutcome {
    #[default]
    Continue,
    Stop,
}
