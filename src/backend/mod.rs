use crate::error::AppResult;
use crate::models::{CatalogEntry, LanguageSelector, NewCatalogEntry, Page, PageRequest};
use crate::parser::{RawFilter, ResourceType};
use async_trait::async_trait;
use std::sync::Arc;

use self::database::{DatabaseBackendConfig, PostgresBackend, SqliteBackend};

pub mod database;

/// Storage dialects
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

/// Core backend abstraction for catalog storage
///
/// Each storage dialect (PostgreSQL, SQLite) implements this trait.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Open a connection pool
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Round trip to the database
    async fn health_check(&self) -> AppResult<()>;

    /// Create the catalog tables if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;

    /// Close the pool
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Catalog entry operations shared by every resource kind
#[async_trait]
pub trait CatalogBackend: Backend {
    /// Store a new entry with its translations and return it as stored
    async fn create_entry(
        &self,
        resource_type: ResourceType,
        entry: &NewCatalogEntry,
    ) -> AppResult<CatalogEntry>;

    /// Find an entry by ID with the translations eligible under `language`
    async fn find_entry_by_id(
        &self,
        resource_type: ResourceType,
        id: i64,
        language: &LanguageSelector,
    ) -> AppResult<Option<CatalogEntry>>;

    /// Filtered, sorted, two-phase paginated search
    async fn find_entries_page(
        &self,
        resource_type: ResourceType,
        filter: &RawFilter,
        language: &LanguageSelector,
        request: &PageRequest,
    ) -> AppResult<Page<CatalogEntry>>;
}

/// Picks the storage dialect named by the configuration
pub struct BackendFactory;

impl BackendFactory {
    pub async fn create(config: &DatabaseBackendConfig) -> AppResult<Arc<dyn CatalogBackend>> {
        let backend: Arc<dyn CatalogBackend> = match config.database_type {
            DatabaseType::PostgreSQL => Arc::new(PostgresBackend::connect(config).await?),
            DatabaseType::SQLite => Arc::new(SqliteBackend::connect(config).await?),
        };
        Ok(backend)
    }
}
