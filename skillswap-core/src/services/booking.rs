//! Booking service - spends credits on a session
//!
//! The two stores know nothing about each other. This is the one place that
//! sequences them, inside a single exclusive section over the shared store:
//! check the balance, flip the session to booked, and only then debit the
//! booker.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Session, UserUpdate};
use crate::ports::exclusive;
use crate::services::{BookOutcome, IdentityStore, SessionStore};

/// What happened to a booking request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingResult {
    Booked {
        session: Session,
        remaining_credits: u32,
    },
    NotSignedIn,
    UnknownSession,
    AlreadyBooked,
    OwnSession,
    InsufficientCredits {
        credits: u32,
        cost: u32,
    },
}

impl BookingResult {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Booked { .. })
    }

    /// Short machine-friendly label, used for event logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::Booked { .. } => "booked",
            Self::NotSignedIn => "not_signed_in",
            Self::UnknownSession => "unknown_session",
            Self::AlreadyBooked => "already_booked",
            Self::OwnSession => "own_session",
            Self::InsufficientCredits { .. } => "insufficient_credits",
        }
    }
}

/// Borrows both stores for the length of one booking
pub struct BookingService<'a> {
    sessions: &'a mut SessionStore,
    identity: &'a mut IdentityStore,
}

impl<'a> BookingService<'a> {
    pub fn new(sessions: &'a mut SessionStore, identity: &'a mut IdentityStore) -> Self {
        Self { sessions, identity }
    }

    /// Book `session_id` for the signed-in user
    ///
    /// Runs in one exclusive section: the session list and the signed-in
    /// user are re-read from the store before any check, so two copies of
    /// the data cannot both book the same session or spend the same credits.
    /// Nothing is written unless every precondition holds. The credit debit
    /// runs only after the session store reports the booking succeeded.
    pub fn book(&mut self, session_id: Uuid) -> Result<BookingResult> {
        let store = self.sessions.store();
        let sessions = &mut *self.sessions;
        let identity = &mut *self.identity;

        exclusive(store.as_ref(), |slots| {
            sessions.refresh(slots)?;
            identity.refresh(slots)?;

            let Some(user) = identity.current_user() else {
                return Ok(BookingResult::NotSignedIn);
            };
            let (user_id, credits) = (user.id, user.credits);

            let Some(session) = sessions.get(session_id) else {
                return Ok(BookingResult::UnknownSession);
            };
            if session.is_booked {
                return Ok(BookingResult::AlreadyBooked);
            }
            if session.tutor_id == user_id {
                return Ok(BookingResult::OwnSession);
            }
            let cost = session.credit_cost;
            let Some(remaining) = credits.checked_sub(cost) else {
                return Ok(BookingResult::InsufficientCredits { credits, cost });
            };

            match sessions.book_session_in(slots, session_id)? {
                BookOutcome::Booked => {}
                BookOutcome::UnknownSession => return Ok(BookingResult::UnknownSession),
                BookOutcome::AlreadyBooked => return Ok(BookingResult::AlreadyBooked),
            }

            identity.merge_update_in(slots, &UserUpdate::credits(remaining))?;

            let session = sessions
                .get(session_id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("session {}", session_id)))?;
            Ok(BookingResult::Booked {
                session,
                remaining_credits: remaining,
            })
        })
    }
}
