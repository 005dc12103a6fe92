use async_trait::async_trait;
use serde_json::Value;

use crate::application::errors::BotError;

/// Transport trait - abstraction for the chat network that delivers events and sends replies
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a reply to a conversation, optionally quoting the original raw message
    async fn send_reply(
        &self,
        conversation_id: &str,
        content: &str,
        quoted: Option<&Value>,
    ) -> Result<(), BotError>;
}
