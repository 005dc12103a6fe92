//! In-memory user and group storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{GroupSettings, UserRecord};
use crate::domain::traits::{GroupStore, UserStore};

/// Process-local store, used by default and in tests
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    groups: RwLock<HashMap<String, GroupSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRecord) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(user.id.clone(), user);
    }

    pub fn insert_group(&self, group: GroupSettings) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        groups.insert(group.id.clone(), group);
    }

    pub fn user(&self, id: &str) -> Option<UserRecord> {
        self.users.read().unwrap_or_else(|e| e.into_inner()).get(id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self.user(id))
    }

    async fn deduct_limit(&self, id: &str, cost: u32) -> Result<Option<u32>, StorageError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        if user.limit < cost {
            return Ok(None);
        }
        user.limit -= cost;
        Ok(Some(user.limit))
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn find_group(&self, id: &str) -> Result<Option<GroupSettings>, StorageError> {
        let groups = self.groups.read().unwrap_or_else(|e| e.into_inner());
        Ok(groups.get(id).cloned())
    }
}
