//! Member - Guild member snapshot

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::value_objects::{MemberId, RoleId};

/// A guild member as read from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Name currently shown in the guild (nickname, else global name, else username)
    pub display_name: String,
    /// Guild nickname, if one is set
    pub nickname: Option<String>,
    pub roles: BTreeSet<RoleId>,
    /// Bots are never renamed or listed
    #[serde(default)]
    pub is_bot: bool,
}

impl Member {
    pub fn new(id: MemberId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            nickname: None,
            roles: BTreeSet::new(),
            is_bot: false,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        self.display_name = nickname.clone();
        self.nickname = Some(nickname);
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}
