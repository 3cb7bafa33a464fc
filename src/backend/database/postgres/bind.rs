use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow, Postgres};
use sqlx::query::Query;
use sqlx::Row;

use crate::backend::database::predicate::SqlParam;
use crate::schema::{FilterField, SemanticType};
use crate::error::AppResult;

/// Bind parameters in placeholder order
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::Integer(value) => query.bind(*value),
            SqlParam::Date(value) => query.bind(*value),
            SqlParam::TextList(values) => query.bind(values.as_slice()),
        };
    }
    query
}

/// Decode one column into its JSON representation
pub fn decode_value(row: &PgRow, field: &FilterField) -> AppResult<Value> {
    let value = match field.semantic_type {
        SemanticType::Integer => row
            .try_get::<Option<i64>, _>(field.column)?
            .map(Value::from),
        SemanticType::Byte => row
            .try_get::<Option<i16>, _>(field.column)?
            .map(Value::from),
        SemanticType::String => row
            .try_get::<Option<String>, _>(field.column)?
            .map(Value::String),
        SemanticType::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(field.column)?
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string())),
        SemanticType::StringArray => row
            .try_get::<Option<Vec<String>>, _>(field.column)?
            .map(Value::from),
    };
    Ok(value.unwrap_or(Value::Null))
}
