//! Owner, premium and usage-limit checks for a matched command

use std::fmt;
use std::sync::Arc;

use crate::domain::entities::{CommandSpec, SenderPrivileges};
use crate::domain::traits::UserStore;
use crate::infrastructure::config::MessagesConfig;

/// Why a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotPremium,
    NotOwner,
    QuotaExhausted,
}

impl DenyReason {
    /// User-facing reply for this reason
    pub fn reply<'a>(&self, messages: &'a MessagesConfig) -> &'a str {
        match self {
            DenyReason::NotPremium => &messages.not_premium,
            DenyReason::NotOwner => &messages.not_owner,
            DenyReason::QuotaExhausted => &messages.limit_exhausted,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotPremium => write!(f, "not premium"),
            DenyReason::NotOwner => write!(f, "not owner"),
            DenyReason::QuotaExhausted => write!(f, "quota exhausted"),
        }
    }
}

/// Result of evaluating one handler for one sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
    /// No quota record for a cost-bearing command: stop without replying
    Abort,
}

/// Evaluates a handler's declared requirements against the sender.
///
/// Quota lookups and deductions fail open: storage errors are logged and the
/// command proceeds. Insufficient quota always denies.
pub struct AccessGate {
    users: Arc<dyn UserStore>,
}

impl AccessGate {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn evaluate(&self, spec: &CommandSpec, sender: &str, privileges: SenderPrivileges) -> AccessDecision {
        if spec.only_premium && !privileges.is_privileged() {
            return AccessDecision::Deny(DenyReason::NotPremium);
        }

        if spec.only_owner && !privileges.is_owner {
            return AccessDecision::Deny(DenyReason::NotOwner);
        }

        match spec.quota_cost {
            Some(cost) if !privileges.is_privileged() => self.charge(sender, cost).await,
            _ => AccessDecision::Allow,
        }
    }

    async fn charge(&self, sender: &str, cost: u32) -> AccessDecision {
        let record = match self.users.find_user(sender).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(sender, "No quota record, aborting dispatch");
                return AccessDecision::Abort;
            }
            Err(e) => {
                tracing::error!(sender, "Failed to read user limit: {}", e);
                return AccessDecision::Allow;
            }
        };

        if !record.can_afford(cost) {
            return AccessDecision::Deny(DenyReason::QuotaExhausted);
        }

        match self.users.deduct_limit(sender, cost).await {
            Ok(Some(remaining)) => {
                tracing::debug!(sender, cost, remaining, "Deducted user limit");
                AccessDecision::Allow
            }
            // Spent concurrently between the read and the deduction
            Ok(None) => AccessDecision::Deny(DenyReason::QuotaExhausted),
            Err(e) => {
                tracing::error!(sender, "Failed to deduct user limit: {}", e);
                AccessDecision::Allow
            }
        }
    }
}
