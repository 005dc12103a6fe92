use serde_json::Value;

/// An inbound chat message as delivered by the transport layer.
///
/// Tokenization into `prefix` and `command` happens before dispatch; the
/// dispatcher treats the message as immutable.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub conversation_id: String,
    pub is_group: bool,
    /// Opaque transport payload, handed back when quoting a reply.
    pub raw: Value,
    pub sender: String,
    pub display_name: String,
    pub full_text: String,
    pub prefix: Option<String>,
    pub command: String,
}

impl InboundMessage {
    pub fn new(conversation_id: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            is_group: false,
            raw: Value::Null,
            sender: sender.into(),
            display_name: String::new(),
            full_text: String::new(),
            prefix: None,
            command: String::new(),
        }
    }

    /// Build a prefixed command message, e.g. `.ping` → prefix `.`, command `ping`.
    pub fn command(
        conversation_id: impl Into<String>,
        sender: impl Into<String>,
        prefix: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        let command = command.into();
        let full_text = format!("{}{}", prefix, command);
        Self::new(conversation_id, sender)
            .with_text(full_text)
            .with_prefix(prefix)
            .with_command(command)
    }

    pub fn in_group(mut self, is_group: bool) -> Self {
        self.is_group = is_group;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    /// Whether the message carries an explicit command prefix.
    pub fn is_prefixed(&self) -> bool {
        self.prefix.as_deref().map_or(false, |p| !p.is_empty())
    }

    /// Sender identity without the network suffix (`628123@s.whatsapp.net` → `628123`).
    pub fn sender_number(&self) -> &str {
        sender_number(&self.sender)
    }

    /// Short preview of the text for logs: first 10 characters plus an ellipsis.
    pub fn preview(&self) -> String {
        if self.full_text.chars().count() > 10 {
            let head: String = self.full_text.chars().take(10).collect();
            format!("{}...", head)
        } else {
            self.full_text.clone()
        }
    }
}

pub fn sender_number(sender: &str) -> &str {
    sender.split('@').next().unwrap_or(sender)
}
