use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::super::config::DatabaseBackendConfig;
use super::{PostgresEntryInserter, PostgresEntryReader};
use crate::backend::database::{UnifiedEntryInsertOps, UnifiedEntryReadOps};
use crate::backend::{Backend, CatalogBackend};
use crate::error::{AppError, AppResult};
use crate::models::{CatalogEntry, LanguageSelector, NewCatalogEntry, Page, PageRequest};
use crate::parser::{RawFilter, ResourceType};
use crate::schema::fields_for;

/// PostgreSQL database backend implementation
pub struct PostgresBackend {
    pool: PgPool,
    entry_insert_ops: UnifiedEntryInsertOps<PostgresEntryInserter>,
    entry_read_ops: UnifiedEntryReadOps<PostgresEntryReader>,
}

impl PostgresBackend {
    /// Create a new PostgreSQL backend instance
    pub fn new(pool: PgPool) -> Self {
        Self {
            entry_insert_ops: UnifiedEntryInsertOps::new(PostgresEntryInserter::new(pool.clone())),
            entry_read_ops: UnifiedEntryReadOps::new(PostgresEntryReader::new(pool.clone())),
            pool,
        }
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.connection_path())
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
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
impl CatalogBackend for PostgresBackend {
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
