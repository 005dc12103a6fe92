//! Group membership events: participant sync and feature fan-out

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::errors::BotError;
use crate::domain::entities::{MembershipAction, MembershipEvent};
use crate::domain::traits::{FeatureFanOut, GroupStore, IncidentSink, ParticipantSync, Transport};
use crate::infrastructure::incident::TracingIncidentLog;
use super::rate_limit::RateLimiter;

/// Incident record name for unhandled membership errors
pub const MEMBERSHIP_INCIDENT: &str = "ERROR-participantUpdate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOutcome {
    /// Action outside add/remove/promote/demote; event dropped
    InvalidAction,
    /// Cache synced, but the group has no settings
    Unmanaged,
    Throttled,
    FannedOut,
    Failed,
}

/// Pipeline for participant changes. Rate limited per group, with no owner bypass.
pub struct MembershipHandler {
    groups: Arc<dyn GroupStore>,
    participants: Arc<dyn ParticipantSync>,
    features: Arc<dyn FeatureFanOut>,
    limiter: RateLimiter,
    incidents: Arc<dyn IncidentSink>,
}

impl MembershipHandler {
    pub fn new(
        groups: Arc<dyn GroupStore>,
        participants: Arc<dyn ParticipantSync>,
        features: Arc<dyn FeatureFanOut>,
        window: Duration,
        ledger_capacity: usize,
    ) -> Self {
        Self {
            groups,
            participants,
            features,
            limiter: RateLimiter::new(window, ledger_capacity),
            incidents: Arc::new(TracingIncidentLog),
        }
    }

    pub fn with_incidents(mut self, sink: Arc<dyn IncidentSink>) -> Self {
        self.incidents = sink;
        self
    }

    pub async fn handle(&self, transport: &dyn Transport, event: &MembershipEvent) -> MembershipOutcome {
        self.handle_at(transport, event, Instant::now()).await
    }

    /// [`MembershipHandler::handle`] with an explicit clock reading
    pub async fn handle_at(&self, transport: &dyn Transport, event: &MembershipEvent, now: Instant) -> MembershipOutcome {
        match self.run(transport, event, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.incidents.record(MEMBERSHIP_INCIDENT, &format!("{:?}", e)).await;
                tracing::error!(group = %event.group_id, "Error in participant update: {}", e);
                MembershipOutcome::Failed
            }
        }
    }

    async fn run(&self, transport: &dyn Transport, event: &MembershipEvent, now: Instant) -> Result<MembershipOutcome, BotError> {
        let settings = self.groups.find_group(&event.group_id).await?;

        let action = match event.action.parse::<MembershipAction>() {
            Ok(action) => action,
            Err(_) => {
                tracing::warn!(group = %event.group_id, "Invalid membership action: {}", event.action);
                return Ok(MembershipOutcome::InvalidAction);
            }
        };

        if let Err(e) = self
            .participants
            .update_participants(transport, &event.group_id, &event.participants, action)
            .await
        {
            tracing::warn!(group = %event.group_id, "Failed to update participants: {}", e);
        }

        let Some(settings) = settings else {
            return Ok(MembershipOutcome::Unmanaged);
        };

        if self.limiter.check_and_record(&event.group_id, now) {
            tracing::warn!(group = %event.group_id, "Rate limit : {}", event.group_id);
            return Ok(MembershipOutcome::Throttled);
        }

        self.features
            .handle_active_features(transport, event, &settings.features)
            .await?;
        Ok(MembershipOutcome::FannedOut)
    }
}
