//! SkillSwap Core - marketplace logic for peer-to-peer skill sharing
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Session, Credential) and form validation
//! - **ports**: The key-value persistence trait
//! - **services**: Session store, identity store, booking, catalog views
//! - **adapters**: Concrete stores (DuckDB, JSON files, memory) and seed data

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use adapters::duckdb::DuckDbStore;
use adapters::json_file::JsonFileStore;
use config::{Config, StorageBackend};
use domain::Argon2Params;
use ports::KeyValueStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{NewSession, Session, User, UserUpdate};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for SkillSwap operations
///
/// Built once at startup and passed to whoever needs it. Holds the
/// configuration, the storage backend and both stores.
pub struct SkillSwapContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: Arc<dyn KeyValueStore>,
    pub sessions: SessionStore,
    pub identity: IdentityStore,
}

impl SkillSwapContext {
    /// Open the data directory, choosing the backend from config
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let store: Arc<dyn KeyValueStore> = match config.storage_backend {
            StorageBackend::Duckdb => Arc::new(DuckDbStore::open(&data_dir.join("skillswap.duckdb"))?),
            StorageBackend::Json => Arc::new(JsonFileStore::open(&data_dir.join("data"))?),
        };

        Self::with_store(config, data_dir, store, Argon2Params::default())
    }

    /// Build a context over an existing store
    pub fn with_store(
        config: Config,
        data_dir: &Path,
        store: Arc<dyn KeyValueStore>,
        params: Argon2Params,
    ) -> Result<Self> {
        let sessions = SessionStore::load(Arc::clone(&store))?;
        let identity = IdentityStore::load(Arc::clone(&store), params, config.require_password)?;

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            store,
            sessions,
            identity,
        })
    }

    /// Book a session for the signed-in user
    pub fn book(&mut self, session_id: Uuid) -> Result<BookingResult> {
        let mut booking = BookingService::new(&mut self.sessions, &mut self.identity);
        Ok(booking.book(session_id)?)
    }

    /// Sessions the signed-in user can browse: everything not tutored by them
    pub fn browse(&self, mut filter: SessionFilter) -> Vec<&Session> {
        if let Some(user) = self.identity.current_user() {
            filter.exclude_tutor = Some(user.id);
        }
        filter.apply(self.sessions.sessions())
    }

    /// Post a session as the signed-in user
    ///
    /// Returns `None` when no one is signed in.
    pub fn post_session(
        &mut self,
        skill_title: &str,
        description: &str,
        duration: u32,
        credit_cost: u32,
        tags: Vec<String>,
    ) -> Result<Option<Session>> {
        let Some(user) = self.identity.current_user() else {
            return Ok(None);
        };
        let new = NewSession {
            tutor_id: user.id,
            tutor_name: user.name.clone(),
            skill_title: skill_title.to_string(),
            description: description.to_string(),
            duration,
            credit_cost,
            tags,
        };
        Ok(Some(self.sessions.create_session(new)?))
    }
}
