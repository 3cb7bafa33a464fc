use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::bind::bind_params;
use crate::backend::database::entry_insert::{EntryInserter, PreparedEntry};
use crate::backend::database::predicate::SqlParam;
use crate::error::{AppError, AppResult};

/// PostgreSQL-specific implementation of EntryInserter
pub struct PostgresEntryInserter {
    pool: PgPool,
}

impl PostgresEntryInserter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn insert_sql(table: &str, columns: &[&str], returning: Option<&str>) -> String {
    let mut sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", table)
    } else {
        let placeholders = (1..=columns.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        )
    };
    if let Some(column) = returning {
        sql.push_str(&format!(" RETURNING {}", column));
    }
    sql
}

#[async_trait]
impl EntryInserter for PostgresEntryInserter {
    async fn execute_entry_insert(&self, data: PreparedEntry) -> AppResult<i64> {
        let resource_type = data.resource_type;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // NULLs are never bound: an untyped text NULL does not coerce to
        // every column type, and omitted columns default to NULL anyway
        let (columns, params): (Vec<&str>, Vec<SqlParam>) = data
            .root_columns
            .into_iter()
            .filter(|(_, value)| *value != SqlParam::Null)
            .unzip();
        let sql = insert_sql(resource_type.root_table(), &columns, Some("id"));
        let id: i64 = bind_params(sqlx::query(&sql), &params)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to insert into {}: {}", resource_type.root_table(), e))
            })?
            .try_get("id")?;

        for translation in data.translations {
            let mut columns = vec![resource_type.translation_foreign_key(), "language"];
            let mut params = vec![SqlParam::Integer(id), SqlParam::Text(translation.language)];
            for (column, value) in translation.columns {
                if value == SqlParam::Null {
                    continue;
                }
                columns.push(column);
                params.push(value);
            }

            let sql = insert_sql(resource_type.translation_table(), &columns, None);
            bind_params(sqlx::query(&sql), &params)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to insert into {}: {}",
                        resource_type.translation_table(),
                        e
                    ))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("movies", &["duration", "genres"], Some("id")),
            "INSERT INTO movies (duration, genres) VALUES ($1, $2) RETURNING id"
        );
        assert_eq!(
            insert_sql("series", &[], Some("id")),
            "INSERT INTO series DEFAULT VALUES RETURNING id"
        );
    }
}
