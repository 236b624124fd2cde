//! Session domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durations (minutes) a session can be offered for
pub const SESSION_DURATIONS: [u32; 5] = [15, 30, 45, 60, 90];

/// Credit prices a session can be offered at
pub const SESSION_COSTS: [u32; 5] = [1, 2, 3, 4, 5];

/// A bookable unit of tutoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub tutor_id: Uuid,
    /// Denormalized for display
    pub tutor_name: String,
    pub skill_title: String,
    pub description: String,
    /// Minutes
    pub duration: u32,
    pub credit_cost: u32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_booked: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Session {
    /// Materialize a new session from caller-supplied fields
    pub fn from_new(new: NewSession) -> Self {
        Self {
            id: Uuid::new_v4(),
            tutor_id: new.tutor_id,
            tutor_name: new.tutor_name,
            skill_title: new.skill_title,
            description: new.description,
            duration: new.duration,
            credit_cost: new.credit_cost,
            tags: new.tags,
            created_at: Utc::now(),
            is_booked: false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Everything needed to post a session; id, timestamp and booked flag are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub tutor_id: Uuid,
    pub tutor_name: String,
    pub skill_title: String,
    pub description: String,
    pub duration: u32,
    pub credit_cost: u32,
    pub tags: Vec<String>,
}
