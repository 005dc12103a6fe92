//! Message dispatcher - Routes one inbound message to its command handlers

use std::sync::Arc;
use std::time::Instant;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, PluginOutcome, SenderPrivileges};
use crate::domain::traits::{CommandHandler, IncidentSink, PassThrough, PreProcessHook, Transport, UserStore};
use crate::infrastructure::config::Config;
use crate::infrastructure::incident::TracingIncidentLog;
use crate::infrastructure::plugins::PluginRegistry;
use super::access::{AccessDecision, AccessGate, DenyReason};
use super::rate_limit::RateLimiter;
use super::resolver::{CommandResolver, Resolution};

/// Incident record name for unhandled dispatch errors
pub const DISPATCH_INCIDENT: &str = "ERROR-processMessage";

/// Incident record name for commands answered with a suggestion
pub const NOT_FOUND_INCIDENT: &str = "ERROR-COMMAND-NOT-FOUND";

/// Where the pipeline stopped for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Pre-process hook vetoed the message
    Vetoed,
    Throttled,
    /// Conversation kind not allowed by `bot-destination`
    WrongDestination,
    Denied(DenyReason),
    /// Cost-bearing command without a quota record
    Aborted,
    /// A handler asked to stop after `invoked` handlers ran
    Stopped { invoked: usize },
    Completed { invoked: usize },
    Suggested(String),
    NotFound,
    /// Unhandled error, recorded as an incident
    Failed,
}

/// Per-message pipeline: pre-process, rate check, destination check,
/// handler fan-out and the did-you-mean fallback.
///
/// Owns the conversation rate ledger; the plugin registry is shared with
/// the reloader.
pub struct Dispatcher {
    config: Arc<Config>,
    registry: Arc<PluginRegistry>,
    users: Arc<dyn UserStore>,
    limiter: RateLimiter,
    gate: AccessGate,
    resolver: CommandResolver,
    pre_process: Arc<dyn PreProcessHook>,
    incidents: Arc<dyn IncidentSink>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, registry: Arc<PluginRegistry>, users: Arc<dyn UserStore>) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit(), config.rate_ledger_capacity),
            gate: AccessGate::new(users.clone()),
            resolver: CommandResolver::new(config.command_similarity),
            pre_process: Arc::new(PassThrough),
            incidents: Arc::new(TracingIncidentLog),
            config,
            registry,
            users,
        }
    }

    pub fn with_pre_process(mut self, hook: Arc<dyn PreProcessHook>) -> Self {
        self.pre_process = hook;
        self
    }

    pub fn with_incidents(mut self, sink: Arc<dyn IncidentSink>) -> Self {
        self.incidents = sink;
        self
    }

    /// Process a message; errors never escape, they become [`DispatchOutcome::Failed`]
    pub async fn process_message(&self, transport: &dyn Transport, message: &InboundMessage) -> DispatchOutcome {
        self.process_message_at(transport, message, Instant::now()).await
    }

    /// [`Dispatcher::process_message`] with an explicit clock reading
    pub async fn process_message_at(
        &self,
        transport: &dyn Transport,
        message: &InboundMessage,
        now: Instant,
    ) -> DispatchOutcome {
        match self.dispatch(transport, message, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.incidents.record(DISPATCH_INCIDENT, &format!("{:?}", e)).await;
                tracing::error!(
                    command = %message.command,
                    conversation = %message.conversation_id,
                    "Error in process_message: {}",
                    e
                );
                DispatchOutcome::Failed
            }
        }
    }

    async fn dispatch(
        &self,
        transport: &dyn Transport,
        message: &InboundMessage,
        now: Instant,
    ) -> Result<DispatchOutcome, BotError> {
        if !self.pre_process.pre_process(transport, message).await? {
            return Ok(DispatchOutcome::Vetoed);
        }

        let is_owner = self.config.is_owner(&message.sender);
        let prefixed = message.is_prefixed();
        let preview = message.preview();

        if prefixed && !is_owner && self.limiter.is_throttled(&message.conversation_id, now) {
            tracing::warn!(sender = %message.display_name, "Rate limit : {}", preview);
            return Ok(DispatchOutcome::Throttled);
        }
        if prefixed {
            self.limiter.record(&message.conversation_id, now);
        }

        if prefixed && !preview.trim().is_empty() {
            tracing::info!(
                sender = %message.sender_number(),
                "{} - {}",
                message.display_name,
                preview
            );
        }

        if !self.config.bot_destination.allows(message.is_group) && !is_owner {
            tracing::info!(
                "Destination handle only - {} chat",
                String::from(self.config.bot_destination)
            );
            return Ok(DispatchOutcome::WrongDestination);
        }

        // One snapshot for the whole dispatch, even if a reload lands meanwhile
        let handlers = self.registry.snapshot();
        match self.resolver.resolve(message, &handlers) {
            Resolution::Matched(matched) => self.run_handlers(transport, message, matched, is_owner).await,
            Resolution::NoMatch { suggestion: Some(suggestion) } => {
                tracing::info!(command = %message.command, "Handler - command not found");
                let prefix = message.prefix.as_deref().unwrap_or(".");
                let text = self
                    .config
                    .messages
                    .command_not_found(&message.command, prefix, &suggestion);
                self.incidents.record(NOT_FOUND_INCIDENT, &text).await;
                transport
                    .send_reply(&message.conversation_id, &text, Some(&message.raw))
                    .await?;
                Ok(DispatchOutcome::Suggested(suggestion))
            }
            Resolution::NoMatch { suggestion: None } => Ok(DispatchOutcome::NotFound),
        }
    }

    async fn run_handlers(
        &self,
        transport: &dyn Transport,
        message: &InboundMessage,
        matched: Vec<Arc<dyn CommandHandler>>,
        is_owner: bool,
    ) -> Result<DispatchOutcome, BotError> {
        let privileges = SenderPrivileges {
            is_owner,
            is_premium: self.resolve_premium(message, &matched, is_owner).await,
        };

        let mut invoked = 0;
        for handler in matched {
            let spec = handler.spec();
            match self.gate.evaluate(spec, &message.sender, privileges).await {
                AccessDecision::Allow => {}
                AccessDecision::Deny(reason) => {
                    tracing::info!(command = %message.command, plugin = %spec.name, "Handler - {}", reason);
                    transport
                        .send_reply(
                            &message.conversation_id,
                            reason.reply(&self.config.messages),
                            Some(&message.raw),
                        )
                        .await?;
                    return Ok(DispatchOutcome::Denied(reason));
                }
                AccessDecision::Abort => return Ok(DispatchOutcome::Aborted),
            }

            let outcome = handler.handle(transport, message).await?;
            invoked += 1;
            tracing::info!(
                plugin = %spec.name,
                sender = %message.sender_number(),
                "Plugins - {} executed",
                message.command
            );

            if outcome == PluginOutcome::Stop {
                return Ok(DispatchOutcome::Stopped { invoked });
            }
        }

        Ok(DispatchOutcome::Completed { invoked })
    }

    /// Premium status, looked up only when a matched handler cares about it
    async fn resolve_premium(
        &self,
        message: &InboundMessage,
        matched: &[Arc<dyn CommandHandler>],
        is_owner: bool,
    ) -> bool {
        let needed = matched
            .iter()
            .any(|h| h.spec().only_premium || h.spec().quota_cost.is_some());
        if is_owner || !needed {
            return false;
        }

        match self.users.is_premium(&message.sender).await {
            Ok(premium) => premium,
            Err(e) => {
                tracing::warn!(sender = %message.sender_number(), "Failed to read premium status: {}", e);
                false
            }
        }
    }
}
