//! SQLite-specific database implementations

pub mod backend_impl;
pub mod bind;
pub mod entry_insert_impl;
pub mod entry_read_impl;
pub mod filter_impl;
pub mod schema;

pub use backend_impl::SqliteBackend;
pub use entry_insert_impl::SqliteEntryInserter;
pub use entry_read_impl::SqliteEntryReader;
pub use filter_impl::SqliteFilterConverter;
