use serde::{Deserialize, Serialize};

/// Stored per-user record holding the consumable usage limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub limit: u32,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub registered: bool,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, limit: u32) -> Self {
        Self {
            id: id.into(),
            limit,
            premium: false,
            registered: true,
        }
    }

    pub fn premium(mut self) -> Self {
        self.premium = true;
        self
    }

    pub fn unregistered(mut self) -> Self {
        self.registered = false;
        self
    }

    /// Whether a command costing `cost` can be paid from the remaining limit.
    pub fn can_afford(&self, cost: u32) -> bool {
        self.limit >= cost && self.limit >= 1
    }
}

/// Privileges resolved for the sender of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderPrivileges {
    pub is_owner: bool,
    pub is_premium: bool,
}

impl SenderPrivileges {
    pub fn owner() -> Self {
        Self {
            is_owner: true,
            is_premium: false,
        }
    }

    pub fn premium() -> Self {
        Self {
            is_owner: false,
            is_premium: true,
        }
    }

    /// Owners and premium users skip premium checks and quota deduction.
    pub fn is_privileged(&self) -> bool {
        self.is_owner || self.is_premium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_afford() {
        assert!(UserRecord::new("u", 5).can_afford(5));
        assert!(!UserRecord::new("u", 4).can_afford(5));
        assert!(!UserRecord::new("u", 0).can_afford(0));
    }
}
