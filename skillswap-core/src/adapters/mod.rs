//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the KeyValueStore port (default)
//! - Plain JSON files for the KeyValueStore port
//! - An in-memory map for tests
//! - Seed data for a fresh install

pub mod duckdb;
pub mod json_file;
pub mod memory;
pub mod seed;
