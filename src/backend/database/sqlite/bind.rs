use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

use crate::backend::database::predicate::SqlParam;
use crate::error::AppResult;
use crate::schema::{FilterField, SemanticType};

/// Bind parameters in placeholder order
pub fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> AppResult<Query<'q, Sqlite, SqliteArguments<'q>>> {
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::Integer(value) => query.bind(*value),
            SqlParam::Date(value) => query.bind(*value),
            // string arrays are stored as JSON text
            SqlParam::TextList(values) => query.bind(serde_json::to_string(values)?),
        };
    }
    Ok(query)
}

/// Decode one column into its JSON representation
pub fn decode_value(row: &SqliteRow, field: &FilterField) -> AppResult<Value> {
    let value = match field.semantic_type {
        SemanticType::Integer | SemanticType::Byte => row
            .try_get::<Option<i64>, _>(field.column)?
            .map(Value::from),
        SemanticType::String | SemanticType::Date => row
            .try_get::<Option<String>, _>(field.column)?
            .map(Value::String),
        SemanticType::StringArray => match row.try_get::<Option<String>, _>(field.column)? {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        },
    };
    Ok(value.unwrap_or(Value::Null))
}
