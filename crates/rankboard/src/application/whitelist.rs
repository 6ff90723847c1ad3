//! Whitelist Application Service (Use Case)
//!
//! Validates and records whitelist form submissions.

use std::sync::Arc;

use crate::domain::entities::{WhitelistApplication, WhitelistForm};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::MemberId;
use crate::ports::WhitelistRepository;

/// Application service for whitelist operations
pub struct WhitelistService<R: WhitelistRepository> {
    repo: Arc<R>,
}

impl<R: WhitelistRepository> WhitelistService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Validate and record a submission. A resubmission replaces the previous one.
    pub async fn submit(
        &self,
        user_id: MemberId,
        form: WhitelistForm,
    ) -> Result<WhitelistApplication, DomainError> {
        let app = WhitelistApplication::from_form(user_id, form)?;
        let saved = self.repo.save(&app).await?;

        tracing::info!(
            user_id = %saved.user_id,
            name = %saved.name,
            recruiter = %saved.recruiter_name,
            "📋 Whitelist application recorded"
        );

        Ok(saved)
    }

    /// Application of a user, if any
    pub async fn get(&self, user_id: MemberId) -> Result<Option<WhitelistApplication>, DomainError> {
        self.repo.find_by_user(user_id).await
    }

    /// Number of recorded applications
    pub async fn count(&self) -> Result<u64, DomainError> {
        self.repo.count().await
    }
}
