//! Test doubles shared by the dispatch and membership integration tests.
//!
//! Transports and handlers record what happened so tests can assert on
//! replies, invocation order and incident records without a real chat network.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use chatgate::application::errors::{BotError, PluginError};
use chatgate::domain::entities::{CommandSpec, InboundMessage, PluginOutcome};
use chatgate::domain::traits::{CommandHandler, IncidentSink, PluginLoader, Transport};
use chatgate::infrastructure::config::Config;
use chatgate::infrastructure::plugins::PluginRegistry;

pub const OWNER: &str = "628000";
pub const OWNER_JID: &str = "628000@s.whatsapp.net";
pub const USER_JID: &str = "628111@s.whatsapp.net";
pub const CHAT: &str = "628111@s.whatsapp.net";

/// One recorded `send_reply` call
#[derive(Debug, Clone)]
pub struct SentReply {
    pub conversation_id: String,
    pub text: String,
    pub quoted: Option<Value>,
}

/// Transport that keeps every reply
#[derive(Default)]
pub struct RecordingTransport {
    replies: Mutex<Vec<SentReply>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.replies().into_iter().map(|r| r.text).collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_reply(&self, conversation_id: &str, content: &str, quoted: Option<&Value>) -> Result<(), BotError> {
        self.replies.lock().unwrap().push(SentReply {
            conversation_id: conversation_id.to_string(),
            text: content.to_string(),
            quoted: quoted.cloned(),
        });
        Ok(())
    }
}

/// Transport whose every send fails
pub struct BrokenTransport;

#[async_trait]
impl Transport for BrokenTransport {
    async fn send_reply(&self, _conversation_id: &str, _content: &str, _quoted: Option<&Value>) -> Result<(), BotError> {
        Err(BotError::Transport("socket closed".to_string()))
    }
}

/// Shared, ordered log of handler invocations
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Handler that appends its name to a journal and returns a fixed outcome
pub struct RecordingHandler {
    spec: CommandSpec,
    journal: Journal,
    outcome: PluginOutcome,
}

impl RecordingHandler {
    pub fn new(spec: CommandSpec, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            spec,
            journal: journal.clone(),
            outcome: PluginOutcome::Continue,
        })
    }

    pub fn stopping(spec: CommandSpec, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            spec,
            journal: journal.clone(),
            outcome: PluginOutcome::Stop,
        })
    }
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn handle(&self, _transport: &dyn Transport, _message: &InboundMessage) -> Result<PluginOutcome, BotError> {
        self.journal.lock().unwrap().push(self.spec.name.clone());
        Ok(self.outcome)
    }
}

/// Handler that always errors
pub struct FailingHandler {
    spec: CommandSpec,
}

impl FailingHandler {
    pub fn new(spec: CommandSpec) -> Arc<Self> {
        Arc::new(Self { spec })
    }
}

#[async_trait]
impl CommandHandler for FailingHandler {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn handle(&self, _transport: &dyn Transport, _message: &InboundMessage) -> Result<PluginOutcome, BotError> {
        Err(PluginError::Execution("handler exploded".to_string()).into())
    }
}

/// Handler that publishes a new handler set while it runs
pub struct ReplacingHandler {
    spec: CommandSpec,
    registry: Arc<PluginRegistry>,
    replacement: Mutex<Option<Vec<Arc<dyn CommandHandler>>>>,
    journal: Journal,
}

impl ReplacingHandler {
    pub fn new(
        spec: CommandSpec,
        registry: &Arc<PluginRegistry>,
        replacement: Vec<Arc<dyn CommandHandler>>,
        journal: &Journal,
    ) -> Arc<Self> {
        Arc::new(Self {
            spec,
            registry: registry.clone(),
            replacement: Mutex::new(Some(replacement)),
            journal: journal.clone(),
        })
    }
}

#[async_trait]
impl CommandHandler for ReplacingHandler {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn handle(&self, _transport: &dyn Transport, _message: &InboundMessage) -> Result<PluginOutcome, BotError> {
        self.journal.lock().unwrap().push(self.spec.name.clone());
        if let Some(next) = self.replacement.lock().unwrap().take() {
            self.registry.replace(next);
        }
        Ok(PluginOutcome::Continue)
    }
}

/// Loader returning a fixed handler set
pub struct FixedLoader {
    handlers: Vec<Arc<dyn CommandHandler>>,
}

#[async_trait]
impl PluginLoader for FixedLoader {
    async fn load(&self) -> Result<Vec<Arc<dyn CommandHandler>>, PluginError> {
        Ok(self.handlers.clone())
    }
}

/// Registry already holding `handlers`, in order
pub fn registry_with(handlers: Vec<Arc<dyn CommandHandler>>) -> Arc<PluginRegistry> {
    let registry = Arc::new(PluginRegistry::new(Arc::new(FixedLoader {
        handlers: handlers.clone(),
    })));
    registry.replace(handlers);
    registry
}

/// Incident sink that keeps `(name, detail)` pairs
#[derive(Default)]
pub struct RecordingIncidents {
    records: Mutex<Vec<(String, String)>>,
}

impl RecordingIncidents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn names(&self) -> Vec<String> {
        self.records.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn details(&self) -> Vec<String> {
        self.records.lock().unwrap().iter().map(|(_, d)| d.clone()).collect()
    }
}

#[async_trait]
impl IncidentSink for RecordingIncidents {
    async fn record(&self, name: &str, detail: &str) {
        self.records
            .lock()
            .unwrap()
            .push((name.to_string(), detail.to_string()));
    }
}

/// Default config with one owner
pub fn config() -> Config {
    let mut config = Config::default();
    config.bot.owners = vec![OWNER.to_string()];
    config
}

/// `.command` from an ordinary user in a private chat
pub fn user_command(command: &str) -> InboundMessage {
    InboundMessage::command(CHAT, USER_JID, ".", command)
        .with_display_name("tester")
        .with_raw(serde_json::json!({ "text": format!(".{}", command) }))
}

/// `.command` from the owner in the same chat
pub fn owner_command(command: &str) -> InboundMessage {
    InboundMessage::command(CHAT, OWNER_JID, ".", command).with_display_name("owner")
}
