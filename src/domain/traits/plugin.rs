use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::{BotError, PluginError};
use crate::domain::entities::{CommandSpec, InboundMessage, PluginOutcome};
use crate::domain::traits::Transport;

/// A registered unit of command logic
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Aliases and access requirements
    fn spec(&self) -> &CommandSpec;

    /// Run the command. `PluginOutcome::Stop` halts the rest of the dispatch.
    async fn handle(&self, transport: &dyn Transport, message: &InboundMessage) -> Result<PluginOutcome, BotError>;
}

/// Produces a fresh, validated handler sequence in load order
#[async_trait]
pub trait PluginLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<Arc<dyn CommandHandler>>, PluginError>;
}
