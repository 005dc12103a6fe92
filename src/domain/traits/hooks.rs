use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, MembershipAction, MembershipEvent};
use crate::domain::traits::Transport;

/// Runs before dispatch; returning `false` vetoes the message
#[async_trait]
pub trait PreProcessHook: Send + Sync {
    async fn pre_process(&self, transport: &dyn Transport, message: &InboundMessage) -> Result<bool, BotError>;
}

/// Hook that lets every message through
pub struct PassThrough;

#[async_trait]
impl PreProcessHook for PassThrough {
    async fn pre_process(&self, _transport: &dyn Transport, _message: &InboundMessage) -> Result<bool, BotError> {
        Ok(true)
    }
}

/// Per-group feature handlers triggered by membership changes
#[async_trait]
pub trait FeatureFanOut: Send + Sync {
    async fn handle_active_features(
        &self,
        transport: &dyn Transport,
        event: &MembershipEvent,
        features: &BTreeSet<String>,
    ) -> Result<(), BotError>;
}

/// Keeps cached group membership in step with participant events
#[async_trait]
pub trait ParticipantSync: Send + Sync {
    async fn update_participants(
        &self,
        transport: &dyn Transport,
        group_id: &str,
        participants: &[String],
        action: MembershipAction,
    ) -> Result<(), BotError>;
}

/// Persists error details under a named record for later triage
#[async_trait]
pub trait IncidentSink: Send + Sync {
    async fn record(&self, name: &str, detail: &str);
}
