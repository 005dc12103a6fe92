//! Pre-process hooks run before dispatch

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::InboundMessage;
use crate::domain::traits::{PreProcessHook, Transport, UserStore};
use crate::infrastructure::config::Config;

/// Refuses commands from unregistered users, except the exempt ones.
///
/// Only prefixed messages from non-owners are checked. When registration is
/// not required the gate always passes.
pub struct RegistrationGate {
    config: Arc<Config>,
    users: Arc<dyn UserStore>,
}

impl RegistrationGate {
    pub fn new(config: Arc<Config>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    fn is_exempt(&self, command: &str) -> bool {
        self.config
            .registration
            .exempt_commands
            .iter()
            .any(|c| c == command)
    }
}

#[async_trait]
impl PreProcessHook for RegistrationGate {
    async fn pre_process(&self, transport: &dyn Transport, message: &InboundMessage) -> Result<bool, BotError> {
        if !self.config.registration.required
            || !message.is_prefixed()
            || message.command.is_empty()
            || self.config.is_owner(&message.sender)
            || self.is_exempt(&message.command)
        {
            return Ok(true);
        }

        if self.users.is_registered(&message.sender).await? {
            return Ok(true);
        }

        tracing::info!(sender = %message.sender_number(), command = %message.command, "Unregistered user");
        transport
            .send_reply(
                &message.conversation_id,
                &self.config.messages.not_registered,
                Some(&message.raw),
            )
            .await?;
        Ok(false)
    }
}
