//! DuckDB key-value store implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result as AnyResult};
use chrono::Utc;
use duckdb::{params, Connection};

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock")
}

fn storage_err(err: duckdb::Error) -> Error {
    Error::storage(err.to_string())
}

/// Slot storage in a single `sys_kv` table
///
/// Each trait call takes `section` and then `conn`, in that order.
/// `with_exclusive` holds `section` for the whole closure and wraps it in a
/// transaction. Other processes are kept out by DuckDB's own file lock.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    section: Mutex<()>,
}

impl DuckDbStore {
    /// Open (or create) the database file and apply pending migrations
    ///
    /// Retries with exponential backoff while another process holds the
    /// file, e.g. two CLI commands started at once.
    pub fn open(db_path: &Path) -> AnyResult<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    let store = Self::from_connection(conn);
                    store.run_migrations()?;
                    return Ok(store);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[skillswap] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> AnyResult<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let store = Self::from_connection(Connection::open_in_memory_with_flags(config)?);
        store.run_migrations()?;
        Ok(store)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            section: Mutex::new(()),
        }
    }

    fn try_open_connection(db_path: &Path) -> AnyResult<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    fn lock_section(&self) -> Result<MutexGuard<'_, ()>> {
        self.section
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        match conn.query_row("SELECT value FROM sys_kv WHERE key = ?", [key], |row| {
            row.get::<_, String>(0)
        }) {
            Ok(value) => Ok(Some(value)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp_millis()],
        )
        .map_err(storage_err)?;
        Ok(())
    }

    fn delete_slot(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM sys_kv WHERE key = ?", [key])
            .map_err(storage_err)?;
        Ok(())
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql).map_err(storage_err)
    }

    /// Apply pending schema migrations
    pub fn run_migrations(&self) -> AnyResult<MigrationResult> {
        let conn = self.lock()?;
        let migration_service = MigrationService::new(&conn);
        migration_service.run_pending()
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT key FROM sys_kv ORDER BY key")
            .map_err(storage_err)?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_err)?;
        Ok(keys)
    }
}

impl KeyValueStore for DuckDbStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _section = self.lock_section()?;
        self.read_slot(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let _section = self.lock_section()?;
        self.write_slot(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _section = self.lock_section()?;
        self.delete_slot(key)
    }

    fn backend_name(&self) -> &'static str {
        "duckdb"
    }

    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()> {
        let _section = self.lock_section()?;
        self.execute_batch("BEGIN TRANSACTION")?;

        match section(&InTransaction { store: self }) {
            Ok(()) => self.execute_batch("COMMIT"),
            Err(e) => {
                // The section's error is the one worth reporting
                let _ = self.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

/// Slot access while `with_exclusive` holds the section and a transaction
struct InTransaction<'a> {
    store: &'a DuckDbStore,
}

impl KeyValueStore for InTransaction<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.read_slot(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.store.write_slot(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.store.delete_slot(key)
    }

    fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    fn with_exclusive(
        &self,
        section: &mut dyn FnMut(&dyn KeyValueStore) -> Result<()>,
    ) -> Result<()> {
        section(self)
    }
}
