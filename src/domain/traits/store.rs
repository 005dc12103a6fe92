use async_trait::async_trait;

use crate::application::errors::StorageError;
use crate::domain::entities::{GroupSettings, UserRecord};

/// User persistence consulted for premium status and usage limits
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// Atomically subtract `cost` from the user's limit.
    ///
    /// Returns the new limit, or `None` when the user is missing or the limit
    /// is lower than `cost`; the stored limit never goes below zero.
    async fn deduct_limit(&self, id: &str, cost: u32) -> Result<Option<u32>, StorageError>;

    async fn is_premium(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.find_user(id).await?.map_or(false, |u| u.premium))
    }

    async fn is_registered(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.find_user(id).await?.map_or(false, |u| u.registered))
    }
}

/// Group settings lookup; `None` means the group is unmanaged
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn find_group(&self, id: &str) -> Result<Option<GroupSettings>, StorageError>;
}
