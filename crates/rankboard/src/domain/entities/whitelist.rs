//! WhitelistApplication - Submitted whitelist form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::MemberId;

/// Longest accepted value for any form field
pub const MAX_FIELD_LEN: usize = 100;

/// Raw form input as typed by the applicant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistForm {
    pub name: String,
    pub game_id: String,
    pub recruiter_name: String,
    pub recruiter_id: String,
}

/// A recorded whitelist application, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistApplication {
    pub user_id: MemberId,
    pub name: String,
    pub game_id: String,
    pub recruiter_name: String,
    pub recruiter_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl WhitelistApplication {
    /// Validate a form and stamp it with the submission time
    pub fn from_form(user_id: MemberId, form: WhitelistForm) -> Result<Self, DomainError> {
        Ok(Self {
            user_id,
            name: field("Nome", &form.name)?,
            game_id: field("ID", &form.game_id)?,
            recruiter_name: field("Nome do Recrutador", &form.recruiter_name)?,
            recruiter_id: field("ID do Recrutador", &form.recruiter_id)?,
            submitted_at: Utc::now(),
        })
    }
}

fn field(label: &str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::Validation(format!("{label} is required")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(DomainError::Validation(format!(
            "{label} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(value.to_string())
}
