//! Message parser - Splits raw text into prefix and command

use crate::domain::entities::InboundMessage;

/// Parses raw chat text into an [`InboundMessage`]
pub struct MessageParser {
    /// Longest first, so `!!` wins over `!`
    prefixes: Vec<String>,
}

impl MessageParser {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { prefixes }
    }

    /// Parse a text message from `sender` in `conversation_id`
    pub fn parse(&self, conversation_id: &str, sender: &str, text: &str) -> InboundMessage {
        let message = InboundMessage::new(conversation_id, sender)
            .with_text(text)
            .with_raw(serde_json::json!({ "text": text }));

        let trimmed = text.trim_start();
        let Some(prefix) = self.prefixes.iter().find(|p| trimmed.starts_with(p.as_str())) else {
            // Plain conversation: the first word still counts as the command token
            let command = trimmed.split_whitespace().next().unwrap_or("").to_lowercase();
            return message.with_command(command);
        };

        let command = trimmed[prefix.len()..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        message.with_prefix(prefix.clone()).with_command(command)
    }
}
