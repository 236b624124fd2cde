//! Input validation for forms
//!
//! The stores accept whatever they are given. Callers that collect user
//! input (the CLI) run these checks first.

use std::sync::OnceLock;

use regex::Regex;

use super::result::{Error, Result};
use super::session::{NewSession, SESSION_COSTS, SESSION_DURATIONS};

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// Normalize tags: deduplicate, trim whitespace, remove empty
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tag in tags {
        let trimmed = tag.trim().to_string();
        if !trimmed.is_empty() && seen.insert(trimmed.clone()) {
            result.push(trimmed);
        }
    }

    result
}

pub fn validate_email(email: &str) -> Result<()> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(Error::validation(format!("'{}' is not a valid email address", email)))
    }
}

/// Checks for the sign-up form
pub fn validate_signup(name: &str, email: &str, password: &str, skill_tags: &[String]) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name cannot be empty"));
    }
    validate_email(email)?;
    if password.is_empty() {
        return Err(Error::validation("password cannot be empty"));
    }
    validate_skill_tags(skill_tags)
}

/// Checks for the profile edit form
pub fn validate_profile(name: &str, skill_tags: &[String]) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name cannot be empty"));
    }
    validate_skill_tags(skill_tags)
}

fn validate_skill_tags(skill_tags: &[String]) -> Result<()> {
    if normalize_tags(skill_tags).is_empty() {
        return Err(Error::validation("select at least one skill tag"));
    }
    Ok(())
}

/// Checks for the post-session form
pub fn validate_new_session(session: &NewSession) -> Result<()> {
    if session.skill_title.trim().is_empty() {
        return Err(Error::validation("skill title cannot be empty"));
    }
    if session.description.trim().is_empty() {
        return Err(Error::validation("description cannot be empty"));
    }
    if !SESSION_DURATIONS.contains(&session.duration) {
        return Err(Error::validation(format!(
            "duration must be one of {:?} minutes",
            SESSION_DURATIONS
        )));
    }
    if !SESSION_COSTS.contains(&session.credit_cost) {
        return Err(Error::validation(format!(
            "credit cost must be one of {:?}",
            SESSION_COSTS
        )));
    }
    if normalize_tags(&session.tags).is_empty() {
        return Err(Error::validation("select at least one tag"));
    }
    Ok(())
}
