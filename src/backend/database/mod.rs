//! Database abstraction layer for the catalog server
//!
//! This module provides a unified interface for database operations across
//! different database backends (PostgreSQL, SQLite) while maintaining
//! database-specific optimizations where needed.
//!
//! # Architecture
//!
//! ```text
//! Common logic (predicate.rs, entry_read.rs, entry_insert.rs)
//!     ↓
//! Database-specific implementations
//!     ├── postgres/ (PostgreSQL-specific code)
//!     └── sqlite/   (SQLite-specific code)
//! ```

pub mod config;
pub mod entry_insert;
pub mod entry_read;
pub mod filter;
pub mod postgres;
pub mod predicate;
pub mod sqlite;


// Re-export key types for convenience
pub use config::DatabaseBackendConfig;

pub use entry_insert::UnifiedEntryInsertOps;

pub use entry_read::UnifiedEntryReadOps;

pub use postgres::{PostgresBackend, PostgresEntryInserter, PostgresEntryReader};
pub use sqlite::{SqliteBackend, SqliteEntryInserter, SqliteEntryReader};
