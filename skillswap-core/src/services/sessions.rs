//! Session store - the list of posted sessions and the booking transition

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::adapters::seed::generate_seed_sessions;
use crate::domain::result::Result;
use crate::domain::{NewSession, Session};
use crate::ports::{exclusive, load_json, save_json, KeyValueStore, SESSIONS_KEY};

/// Outcome of marking a session booked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookOutcome {
    Booked,
    UnknownSession,
    AlreadyBooked,
}

impl BookOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Booked)
    }
}

/// In-memory session collection, written through to the store on change
///
/// Ordered most-recent-first. Sessions are only ever prepended or flipped
/// from unbooked to booked. Every change re-reads the slot inside an
/// exclusive section first, so writers sharing the data never overwrite
/// each other's posts or bookings.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    sessions: Vec<Session>,
}

impl SessionStore {
    /// Load the persisted collection, seeding example data on first use
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let sessions = exclusive(store.as_ref(), |slots| {
            match load_json::<Vec<Session>>(slots, SESSIONS_KEY)? {
                Some(sessions) => Ok(sessions),
                None => {
                    let seeded = generate_seed_sessions();
                    save_json(slots, SESSIONS_KEY, &seeded)?;
                    Ok(seeded)
                }
            }
        })?;
        Ok(Self { store, sessions })
    }

    pub(crate) fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Replace the cached collection with what `slots` holds now
    pub(crate) fn refresh(&mut self, slots: &dyn KeyValueStore) -> Result<()> {
        if let Some(sessions) = load_json(slots, SESSIONS_KEY)? {
            self.sessions = sessions;
        }
        Ok(())
    }

    /// All sessions, most recent first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: Uuid) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Post a new session. Field values are taken as given.
    pub fn create_session(&mut self, new: NewSession) -> Result<Session> {
        let store = self.store();
        exclusive(store.as_ref(), |slots| {
            self.refresh(slots)?;
            let session = Session::from_new(new);
            self.sessions.insert(0, session.clone());
            save_json(slots, SESSIONS_KEY, &self.sessions)?;
            Ok(session)
        })
    }

    /// Mark a session booked. Credits are not touched here.
    pub fn book_session(&mut self, id: Uuid) -> Result<BookOutcome> {
        let store = self.store();
        exclusive(store.as_ref(), |slots| self.book_session_in(slots, id))
    }

    /// `book_session` for a caller already inside an exclusive section
    pub(crate) fn book_session_in(&mut self, slots: &dyn KeyValueStore, id: Uuid) -> Result<BookOutcome> {
        self.refresh(slots)?;

        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(BookOutcome::UnknownSession);
        };
        if session.is_booked {
            return Ok(BookOutcome::AlreadyBooked);
        }

        session.is_booked = true;
        save_json(slots, SESSIONS_KEY, &self.sessions)?;
        Ok(BookOutcome::Booked)
    }
}
