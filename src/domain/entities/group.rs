use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-group settings; only the enabled feature set matters to the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    pub id: String,
    pub features: BTreeSet<String>,
}

impl GroupSettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            features: BTreeSet::new(),
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

/// Kind of group membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipAction {
    Add,
    Remove,
    Promote,
    Demote,
}

impl MembershipAction {
    pub fn as_str(&self) -> &str {
        match self {
            MembershipAction::Add => "add",
            MembershipAction::Remove => "remove",
            MembershipAction::Promote => "promote",
            MembershipAction::Demote => "demote",
        }
    }
}

impl FromStr for MembershipAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(MembershipAction::Add),
            "remove" => Ok(MembershipAction::Remove),
            "promote" => Ok(MembershipAction::Promote),
            "demote" => Ok(MembershipAction::Demote),
            other => Err(format!("unknown membership action: {}", other)),
        }
    }
}

impl fmt::Display for MembershipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participants-changed event for one group.
///
/// `action` is kept raw; it is validated by the membership handler.
#[derive(Debug, Clone)]
pub struct MembershipEvent {
    pub group_id: String,
    pub action: String,
    pub participants: Vec<String>,
}

impl MembershipEvent {
    pub fn new(group_id: impl Into<String>, action: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            group_id: group_id.into(),
            action: action.into(),
            participants,
        }
    }
}
