use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use super::super::config::DatabaseBackendConfig;
use super::{SqliteEntryInserter, SqliteEntryReader};
use crate::backend::database::{UnifiedEntryInsertOps, UnifiedEntryReadOps};
use crate::backend::{Backend, CatalogBackend};
use crate::error::{AppError, AppResult};
use crate::models::{CatalogEntry, LanguageSelector, NewCatalogEntry, Page, PageRequest};
use crate::parser::{RawFilter, ResourceType};
use crate::schema::fields_for;

/// SQLite database backend implementation
pub struct SqliteBackend {
    pool: SqlitePool,
    entry_insert_ops: UnifiedEntryInsertOps<SqliteEntryInserter>,
    entry_read_ops: UnifiedEntryReadOps<SqliteEntryReader>,
}

impl SqliteBackend {
    /// Create a new SQLite backend instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            entry_insert_ops: UnifiedEntryInsertOps::new(SqliteEntryInserter::new(pool.clone())),
            entry_read_ops: UnifiedEntryReadOps::new(SqliteEntryReader::new(pool.clone())),
            pool,
        }
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config.validate()?;

        let options = SqliteConnectOptions::from_str(&config.connection_path())
            .map_err(|e| AppError::Database(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout());

        // Every connection to ":memory:" opens its own database, so the pool
        // must keep exactly one connection alive for the process lifetime.
        if config.is_memory_database() {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        tracing::info!(url = %config.connection_path(), "connected to SQLite");
        Ok(Self::new(pool))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_catalog_schema(&self.pool).await
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for SqliteBackend {
    async fn create_entry(
        &self,
        resource_type: ResourceType,
        entry: &NewCatalogEntry,
    ) -> AppResult<CatalogEntry> {
        let schema = fields_for(resource_type);
        let id = self.entry_insert_ops.create_entry(schema, entry).await?;
        self.entry_read_ops
            .find_entry_by_id(schema, id, &LanguageSelector::Any)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Created {} {} could not be read back", resource_type, id)))
    }

    async fn find_entry_by_id(
        &self,
        resource_type: ResourceType,
        id: i64,
        language: &LanguageSelector,
    ) -> AppResult<Option<CatalogEntry>> {
        self.entry_read_ops
            .find_entry_by_id(fields_for(resource_type), id, language)
            .await
    }

    async fn find_entries_page(
        &self,
        resource_type: ResourceType,
        filter: &RawFilter,
        language: &LanguageSelector,
        request: &PageRequest,
    ) -> AppResult<Page<CatalogEntry>> {
        self.entry_read_ops
            .find_page(fields_for(resource_type), filter, language, request)
            .await
    }
}
