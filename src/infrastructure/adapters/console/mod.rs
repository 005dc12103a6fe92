//! Console adapter for development/testing

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use tokio::sync::mpsc;
use crate::application::errors::BotError;
use crate::domain::traits::Transport;

// `:event <action> <participant>...`
static EVENT_DIRECTIVE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^:event\s+(\S+)(.*)$").ok());

/// Console input that is not a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleDirective {
    Quit,
    /// Simulated membership change in the console group
    Event { action: String, participants: Vec<String> },
}

/// Recognize `:quit` and `:event` lines; anything else is chat text
pub fn parse_directive(line: &str) -> Option<ConsoleDirective> {
    let line = line.trim();
    if line == ":quit" {
        return Some(ConsoleDirective::Quit);
    }

    let caps = EVENT_DIRECTIVE.as_ref()?.captures(line)?;
    let action = caps.get(1)?.as_str().to_string();
    let participants = caps
        .get(2)
        .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    Some(ConsoleDirective::Event { action, participants })
}

/// A reply captured by the console adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleReply {
    pub conversation_id: String,
    pub text: String,
}

/// Console transport: prints replies, optionally forwarding them to a channel
pub struct ConsoleAdapter {
    sender: Option<mpsc::UnboundedSender<ConsoleReply>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self { sender: None }
    }

    pub fn with_sender(mut self, sender: mpsc::UnboundedSender<ConsoleReply>) -> Self {
        self.sender = Some(sender);
        self
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ConsoleAdapter {
    async fn send_reply(&self, conversation_id: &str, content: &str, quoted: Option<&Value>) -> Result<(), BotError> {
        match quoted.and_then(|q| q.get("text")).and_then(Value::as_str) {
            Some(original) => println!("[BOT] (re: {}) {}", original, content),
            None => println!("[BOT] {}", content),
        }

        if let Some(sender) = &self.sender {
            sender
                .send(ConsoleReply {
                    conversation_id: conversation_id.to_string(),
                    text: content.to_string(),
                })
                .map_err(|e| BotError::Transport(format!("console channel closed: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_replies() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let adapter = ConsoleAdapter::new().with_sender(tx);
        adapter.send_reply("chat", "hello", None).await.unwrap();
        let reply = rx.recv().await.unwrap();
        assert_eq!(reply, ConsoleReply { conversation_id: "chat".to_string(), text: "hello".to_string() });
    }

    #[tokio::test]
    async fn test_closed_channel_is_transport_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let adapter = ConsoleAdapter::new().with_sender(tx);
        assert!(matches!(adapter.send_reply("chat", "x", None).await, Err(BotError::Transport(_))));
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(parse_directive(" :quit "), Some(ConsoleDirective::Quit));
        assert_eq!(
            parse_directive(":event add 628111@s.whatsapp.net 628222@s.whatsapp.net"),
            Some(ConsoleDirective::Event {
                action: "add".to_string(),
                participants: vec!["628111@s.whatsapp.net".to_string(), "628222@s.whatsapp.net".to_string()],
            })
        );
        assert_eq!(parse_directive(":event"), None);
        assert_eq!(parse_directive(".ping"), None);
    }
}
