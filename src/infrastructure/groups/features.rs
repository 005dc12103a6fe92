//! Announcements for groups that enabled membership features

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{MembershipAction, MembershipEvent};
use crate::domain::traits::{FeatureFanOut, Transport};

/// Sends a templated message per participant when the matching feature is enabled.
///
/// Features: `welcome` (add), `left` (remove), `promote`, `demote`.
/// Templates accept `{user}` and `{group}`.
pub struct FeatureAnnouncer {
    welcome: String,
    left: String,
    promote: String,
    demote: String,
}

impl FeatureAnnouncer {
    pub fn new() -> Self {
        Self {
            welcome: "Welcome @{user}!".to_string(),
            left: "Goodbye @{user}.".to_string(),
            promote: "@{user} is now an admin.".to_string(),
            demote: "@{user} is no longer an admin.".to_string(),
        }
    }

    fn feature_for(action: MembershipAction) -> &'static str {
        match action {
            MembershipAction::Add => "welcome",
            MembershipAction::Remove => "left",
            MembershipAction::Promote => "promote",
            MembershipAction::Demote => "demote",
        }
    }

    fn template(&self, action: MembershipAction) -> &str {
        match action {
            MembershipAction::Add => &self.welcome,
            MembershipAction::Remove => &self.left,
            MembershipAction::Promote => &self.promote,
            MembershipAction::Demote => &self.demote,
        }
    }
}

impl Default for FeatureAnnouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeatureFanOut for FeatureAnnouncer {
    async fn handle_active_features(
        &self,
        transport: &dyn Transport,
        event: &MembershipEvent,
        features: &BTreeSet<String>,
    ) -> Result<(), BotError> {
        let Ok(action) = event.action.parse::<MembershipAction>() else {
            return Ok(());
        };
        if !features.contains(Self::feature_for(action)) {
            return Ok(());
        }

        for participant in &event.participants {
            let user = participant.split('@').next().unwrap_or(participant);
            let text = self
                .template(action)
                .replace("{user}", user)
                .replace("{group}", &event.group_id);
            transport.send_reply(&event.group_id, &text, None).await?;
        }
        Ok(())
    }
}
