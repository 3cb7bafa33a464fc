use async_trait::async_trait;
use serde_json::Map;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use super::bind::{bind_params, decode_value};
use super::filter_impl::SqliteFilterConverter;
use crate::backend::database::entry_read::{EntryReader, ProjectionRow, ReadSession, Statement};
use crate::backend::database::filter::FilterConverter;
use crate::error::{AppError, AppResult};
use crate::schema::FilterSchema;

/// SQLite-specific implementation of EntryReader
pub struct SqliteEntryReader {
    pool: SqlitePool,
    converter: SqliteFilterConverter,
}

impl SqliteEntryReader {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            converter: SqliteFilterConverter::new(),
        }
    }
}

#[async_trait]
impl EntryReader for SqliteEntryReader {
    fn converter(&self) -> &dyn FilterConverter {
        &self.converter
    }

    async fn begin_read(&self) -> AppResult<Box<dyn ReadSession>> {
        // BEGIN is deferred: the read snapshot is taken by the first SELECT
        // and held until commit, so both phases see the same data.
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin read transaction: {}", e)))?;
        Ok(Box::new(SqliteReadSession { tx }))
    }
}

pub struct SqliteReadSession {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl ReadSession for SqliteReadSession {
    async fn count_items(&mut self, statement: &Statement) -> AppResult<i64> {
        let row = bind_params(sqlx::query(&statement.sql), &statement.params)?
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count entries: {}", e)))?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn select_window(&mut self, statement: &Statement) -> AppResult<Vec<i64>> {
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)?
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
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)?
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch entries: {}", e)))?;

        let mut projections = Vec::with_capacity(rows.len());
        for row in rows {
            let mut attributes = Map::new();
            for field in schema.root_fields() {
                attributes.insert(field.name.to_string(), decode_value(&row, field)?);
            }
            let mut translation = Map::new();
            for field in schema.translation_fields() {
                translation.insert(field.name.to_string(), decode_value(&row, field)?);
            }
            projections.push(ProjectionRow {
                id: row.try_get("id")?,
                attributes,
                language: row.try_get("language")?,
                translation,
            });
        }
        Ok(projections)
    }

    async fn finish(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to end read transaction: {}", e)))
    }
}
