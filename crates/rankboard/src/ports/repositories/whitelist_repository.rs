//! Whitelist Repository Port
//!
//! Abstract interface for WhitelistApplication persistence operations.

use async_trait::async_trait;

use crate::domain::entities::WhitelistApplication;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::MemberId;

/// Repository interface for WhitelistApplication entities
#[async_trait]
pub trait WhitelistRepository: Send + Sync {
    /// Save an application (insert or replace the user's previous one)
    async fn save(&self, app: &WhitelistApplication) -> Result<WhitelistApplication, DomainError>;

    /// Find the application of a user
    async fn find_by_user(
        &self,
        user_id: MemberId,
    ) -> Result<Option<WhitelistApplication>, DomainError>;

    /// Number of recorded applications
    async fn count(&self) -> Result<u64, DomainError>;
}
