//! Event log migrations - embedded SQL files for logs.duckdb
//!
//! Kept separate from the main migrations so the log database can be
//! deleted or exported without touching marketplace data.

/// Format: (filename, sql_content), applied in order.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_event_log.sql", include_str!("001_event_log.sql")),
];
