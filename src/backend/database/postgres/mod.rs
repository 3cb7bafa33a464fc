//! PostgreSQL-specific database implementations

pub mod backend_impl;
pub mod bind;
pub mod entry_insert_impl;
pub mod entry_read_impl;
pub mod filter_impl;
pub mod schema;

pub use backend_impl::PostgresBackend;
pub use entry_insert_impl::PostgresEntryInserter;
pub use entry_read_impl::PostgresEntryReader;
pub use filter_impl::PostgresFilterConverter;
