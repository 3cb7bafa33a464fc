use async_trait::async_trait;
use sqlx::SqlitePool;

use super::bind::bind_params;
use crate::backend::database::entry_insert::{EntryInserter, PreparedEntry};
use crate::backend::database::predicate::SqlParam;
use crate::error::{AppError, AppResult};

/// SQLite-specific implementation of EntryInserter
pub struct SqliteEntryInserter {
    pool: SqlitePool,
}

impl SqliteEntryInserter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// `INSERT INTO table (a, b) VALUES (?1, ?2)`
fn insert_sql(table: &str, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", table);
    }
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[async_trait]
impl EntryInserter for SqliteEntryInserter {
    async fn execute_entry_insert(&self, data: PreparedEntry) -> AppResult<i64> {
        let resource_type = data.resource_type;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // absent attributes are left to the column default
        let (columns, params): (Vec<&str>, Vec<SqlParam>) = data
            .root_columns
            .into_iter()
            .filter(|(_, value)| *value != SqlParam::Null)
            .unzip();
        let sql = insert_sql(resource_type.root_table(), &columns);
        let id = bind_params(sqlx::query(&sql), &params)?
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to insert into {}: {}", resource_type.root_table(), e))
            })?
            .last_insert_rowid();

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

            let sql = insert_sql(resource_type.translation_table(), &columns);
            bind_params(sqlx::query(&sql), &params)?
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
            insert_sql("movie_translations", &["movie_id", "language", "name"]),
            "INSERT INTO movie_translations (movie_id, language, name) VALUES (?1, ?2, ?3)"
        );
        assert_eq!(insert_sql("series", &[]), "INSERT INTO series DEFAULT VALUES");
    }
}
