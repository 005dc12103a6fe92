//! Cached group membership, kept in step with participant events

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::MembershipAction;
use crate::domain::traits::{ParticipantSync, Transport};

#[derive(Debug, Clone, Default)]
struct GroupMembers {
    members: BTreeSet<String>,
    admins: BTreeSet<String>,
}

#[derive(Default)]
pub struct ParticipantCache {
    groups: RwLock<HashMap<String, GroupMembers>>,
}

impl ParticipantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, group_id: &str, participants: &[String], action: MembershipAction) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        let group = groups.entry(group_id.to_string()).or_default();

        for p in participants {
            match action {
                MembershipAction::Add => {
                    group.members.insert(p.clone());
                }
                MembershipAction::Remove => {
                    group.members.remove(p);
                    group.admins.remove(p);
                }
                MembershipAction::Promote => {
                    group.members.insert(p.clone());
                    group.admins.insert(p.clone());
                }
                MembershipAction::Demote => {
                    group.admins.remove(p);
                }
            }
        }
    }

    pub fn members(&self, group_id: &str) -> Vec<String> {
        let groups = self.groups.read().unwrap_or_else(|e| e.into_inner());
        groups
            .get(group_id)
            .map(|g| g.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_admin(&self, group_id: &str, participant: &str) -> bool {
        let groups = self.groups.read().unwrap_or_else(|e| e.into_inner());
        groups.get(group_id).map_or(false, |g| g.admins.contains(participant))
    }
}

#[async_trait]
impl ParticipantSync for ParticipantCache {
    async fn update_participants(
        &self,
        _transport: &dyn Transport,
        group_id: &str,
        participants: &[String],
        action: MembershipAction,
    ) -> Result<(), BotError> {
        self.apply(group_id, participants, action);
        tracing::debug!(group = group_id, %action, count = participants.len(), "Updated participant cache");
        Ok(())
    }
}
