//! User domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credit balance every new account starts with
pub const STARTING_CREDITS: u32 = 5;

/// A marketplace member. The same record is stored in the registry and,
/// while signed in, as the current identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub skill_tags: Vec<String>,
    pub credits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Create a freshly registered user with the starting balance
    pub fn new(name: impl Into<String>, email: impl Into<String>, skill_tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            skill_tags,
            credits: STARTING_CREDITS,
            avatar: None,
        }
    }

    /// Shallow-merge the present fields of `update` into this record.
    /// The id is never touched.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(tags) = &update.skill_tags {
            self.skill_tags = tags.clone();
        }
        if let Some(credits) = update.credits {
            self.credits = credits;
        }
        if let Some(avatar) = &update.avatar {
            self.avatar = Some(avatar.clone());
        }
    }
}

/// Partial set of user fields for a merge update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserUpdate {
    pub fn credits(credits: u32) -> Self {
        Self {
            credits: Some(credits),
            ..Self::default()
        }
    }

    /// True if no field would change anything
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
