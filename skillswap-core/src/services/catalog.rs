//! Catalog views - filtering and summary figures over the session list
//!
//! Nothing here is stored; every view is recomputed from the full
//! collection.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Session, User};

/// Browse filter for the session list
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Case-insensitive substring of title, description or tutor name
    pub search: Option<String>,
    /// Match sessions carrying any of these tags; empty matches all
    pub tags: Vec<String>,
    /// Hide sessions tutored by this user
    pub exclude_tutor: Option<Uuid>,
    /// Hide sessions that are already booked
    pub only_available: bool,
}

impl SessionFilter {
    pub fn matches(&self, session: &Session) -> bool {
        if self.exclude_tutor == Some(session.tutor_id) {
            return false;
        }
        if self.only_available && session.is_booked {
            return false;
        }

        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                session.skill_title.to_lowercase().contains(&term)
                    || session.description.to_lowercase().contains(&term)
                    || session.tutor_name.to_lowercase().contains(&term)
            }
        };

        let matches_tags =
            self.tags.is_empty() || self.tags.iter().any(|tag| session.has_tag(tag));

        matches_search && matches_tags
    }

    /// Sessions passing the filter, order preserved
    pub fn apply<'a>(&self, sessions: &'a [Session]) -> Vec<&'a Session> {
        sessions.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Unbooked sessions among the filtered ones
    pub available_sessions: usize,
    pub total_tutors: usize,
    pub total_sessions: usize,
}

pub fn dashboard_stats(all: &[Session], filtered: &[&Session]) -> DashboardStats {
    let tutors: HashSet<Uuid> = all.iter().map(|s| s.tutor_id).collect();
    DashboardStats {
        available_sessions: filtered.iter().filter(|s| !s.is_booked).count(),
        total_tutors: tutors.len(),
        total_sessions: all.len(),
    }
}

/// Figures and lists shown on a user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub sessions_posted: usize,
    pub credits_earned: u32,
    pub sessions_taken: usize,
    pub posted: Vec<Session>,
    pub booked: Vec<Session>,
}

/// Build a profile summary for `user`
///
/// "Taken" counts every booked session the user did not tutor. Bookings do
/// not record who booked, so this is a marketplace-wide figure.
pub fn profile_summary(user: &User, sessions: &[Session]) -> ProfileSummary {
    let posted: Vec<Session> = sessions
        .iter()
        .filter(|s| s.tutor_id == user.id)
        .cloned()
        .collect();
    let booked: Vec<Session> = sessions
        .iter()
        .filter(|s| s.is_booked && s.tutor_id != user.id)
        .cloned()
        .collect();
    let credits_earned = posted
        .iter()
        .filter(|s| s.is_booked)
        .map(|s| s.credit_cost)
        .sum();

    ProfileSummary {
        sessions_posted: posted.len(),
        credits_earned,
        sessions_taken: booked.len(),
        posted,
        booked,
    }
}
