//! Compiled-in handler implementations that manifests bind to by name

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::{BotError, PluginError};
use crate::domain::entities::{CommandSpec, InboundMessage, PluginOutcome};
use crate::domain::traits::{CommandHandler, Transport};
use super::manifest::PluginManifest;

/// Builds a handler from its validated spec and manifest
pub type HandlerConstructor =
    Arc<dyn Fn(CommandSpec, &PluginManifest) -> Result<Arc<dyn CommandHandler>, PluginError> + Send + Sync>;

/// Maps manifest `handler` names to constructors
#[derive(Clone)]
pub struct HandlerFactory {
    constructors: HashMap<String, HandlerConstructor>,
}

impl HandlerFactory {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Factory with the `reply`, `echo` and `ping` builtins
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("reply", |spec, manifest| {
            let text = manifest.reply.clone().ok_or_else(|| PluginError::Invalid {
                name: manifest.name.clone(),
                reason: "reply handler needs a `reply` text".to_string(),
            })?;
            Ok(Arc::new(BuiltinHandler::new(spec, Action::Reply(text), manifest.stop)) as Arc<dyn CommandHandler>)
        });
        factory.register("echo", |spec, manifest| {
            Ok(Arc::new(BuiltinHandler::new(spec, Action::Echo, manifest.stop)) as Arc<dyn CommandHandler>)
        });
        factory.register("ping", |spec, manifest| {
            let text = manifest.reply.clone().unwrap_or_else(|| "pong".to_string());
            Ok(Arc::new(BuiltinHandler::new(spec, Action::Reply(text), manifest.stop)) as Arc<dyn CommandHandler>)
        });
        factory
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(CommandSpec, &PluginManifest) -> Result<Arc<dyn CommandHandler>, PluginError> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn build(&self, manifest: &PluginManifest) -> Result<Arc<dyn CommandHandler>, PluginError> {
        let spec = manifest.spec()?;
        let constructor = self.constructors.get(&manifest.handler).ok_or_else(|| PluginError::UnknownHandler {
            plugin: manifest.name.clone(),
            handler: manifest.handler.clone(),
        })?;
        constructor(spec, manifest)
    }
}

impl Default for HandlerFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

enum Action {
    /// Fixed text with `{name}`, `{command}` and `{sender}` placeholders
    Reply(String),
    /// Repeat whatever follows the command
    Echo,
}

struct BuiltinHandler {
    spec: CommandSpec,
    action: Action,
    stop: bool,
}

impl BuiltinHandler {
    fn new(spec: CommandSpec, action: Action, stop: bool) -> Self {
        Self { spec, action, stop }
    }

    fn render(&self, message: &InboundMessage) -> Option<String> {
        match &self.action {
            Action::Reply(template) => Some(
                template
                    .replace("{name}", &message.display_name)
                    .replace("{command}", &message.command)
                    .replace("{sender}", message.sender_number()),
            ),
            Action::Echo => {
                let rest = command_arguments(message);
                if rest.is_empty() {
                    None
                } else {
                    Some(rest.to_string())
                }
            }
        }
    }
}

/// Text after `<prefix><command>`
fn command_arguments(message: &InboundMessage) -> &str {
    let text = message.full_text.trim_start();
    let text = message
        .prefix
        .as_deref()
        .and_then(|p| text.strip_prefix(p))
        .unwrap_or(text);
    text.trim_start()
        .split_once(char::is_whitespace)
        .map_or("", |(_, rest)| rest.trim())
}

#[async_trait]
impl CommandHandler for BuiltinHandler {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn handle(&self, transport: &dyn Transport, message: &InboundMessage) -> Result<PluginOutcome, BotError> {
        if let Some(text) = self.render(message) {
            transport
                .send_reply(&message.conversation_id, &text, Some(&message.raw))
                .await?;
        }

        Ok(if self.stop { PluginOutcome::Stop } else { PluginOutcome::Continue })
    }
}
