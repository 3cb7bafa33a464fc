use async_trait::async_trait;
use serde_json::Map;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::bind::{bind_params, decode_value};
use super::filter_impl::PostgresFilterConverter;
use crate::backend::database::entry_read::{EntryReader, ProjectionRow, ReadSession, Statement};
use crate::backend::database::filter::FilterConverter;
use crate::error::{AppError, AppResult};
use crate::schema::FilterSchema;

/// PostgreSQL-specific implementation of EntryReader
pub struct PostgresEntryReader {
    pool: PgPool,
    converter: PostgresFilterConverter,
}

impl PostgresEntryReader {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            converter: PostgresFilterConverter::new(),
        }
    }
}

#[async_trait]
impl EntryReader for PostgresEntryReader {
    fn converter(&self) -> &dyn FilterConverter {
        &self.converter
    }

    async fn begin_read(&self) -> AppResult<Box<dyn ReadSession>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin read transaction: {}", e)))?;

        // One snapshot for the count, the window and the projection
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to set isolation level: {}", e)))?;

        Ok(Box::new(PostgresReadSession { tx }))
    }
}

pub struct PostgresReadSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReadSession for PostgresReadSession {
    async fn count_items(&mut self, statement: &Statement) -> AppResult<i64> {
        let row = bind_params(sqlx::query(&statement.sql), &statement.params)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count entries: {}", e)))?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn select_window(&mut self, statement: &Statement) -> AppResult<Vec<i64>> {
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select identifier window: {}", e)))?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("id").map_err(AppError::from))
            .collect()
    }

    async fn fetch_projections(
        &mut self,
        statement: &Statement,
        schema: &FilterSchema,
    ) -> AppResult<Vec<ProjectionRow>> {
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch entries: {}", e)))?;

        rows.iter()
            .map(|row| {
                let mut attributes = Map::new();
                for field in schema.root_fields() {
                    attributes.insert(field.name.to_string(), decode_value(row, field)?);
                }
                let mut translation = Map::new();
                for field in schema.translation_fields() {
                    translation.insert(field.name.to_string(), decode_value(row, field)?);
                }
                Ok::<_, AppError>(ProjectionRow {
                    id: row.try_get("id")?,
                    attributes,
                    language: row.try_get("language")?,
                    translation,
                })
            })
            .collect()
    }

    async fn finish(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to end read transaction: {}", e)))
    }
}
