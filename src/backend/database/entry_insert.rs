use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use super::predicate::SqlParam;
use crate::error::{AppError, AppResult};
use crate::models::NewCatalogEntry;
use crate::parser::ResourceType;
use crate::schema::{validate_entry, FilterField, FilterSchema, SemanticType};

/// Typed column values ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEntry {
    pub resource_type: ResourceType,
    /// Every root column in declaration order, `Null` when absent
    pub root_columns: Vec<(&'static str, SqlParam)>,
    pub translations: Vec<PreparedTranslation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTranslation {
    pub language: String,
    pub columns: Vec<(&'static str, SqlParam)>,
}

/// Database-specific adapter for entry INSERT operations
#[async_trait]
pub trait EntryInserter: Send + Sync {
    /// Write the root row and its translations in one transaction and
    /// return the new root identifier
    async fn execute_entry_insert(&self, data: PreparedEntry) -> AppResult<i64>;
}

/// Shared business logic for entry INSERT operations
pub struct EntryInsertProcessor;

impl EntryInsertProcessor {
    /// Validate the payload and coerce every attribute to its semantic type
    pub fn prepare_entry_for_insert(
        schema: &FilterSchema,
        entry: &NewCatalogEntry,
    ) -> AppResult<PreparedEntry> {
        validate_entry(schema, entry)?;

        let root_columns = schema
            .root_fields()
            .map(|field| {
                let value = entry.attributes.get(field.name).unwrap_or(&Value::Null);
                Ok((field.column, Self::coerce_json(field, value)?))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let translations = entry
            .translations
            .iter()
            .map(|translation| {
                let columns = schema
                    .translation_fields()
                    .map(|field| {
                        let value = translation.fields.get(field.name).unwrap_or(&Value::Null);
                        Ok((field.column, Self::coerce_json(field, value)?))
                    })
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(PreparedTranslation {
                    language: translation.language.clone(),
                    columns,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PreparedEntry {
            resource_type: schema.resource_type,
            root_columns,
            translations,
        })
    }

    /// Convert a JSON attribute into a bindable value
    pub fn coerce_json(field: &FilterField, value: &Value) -> AppResult<SqlParam> {
        let invalid = |reason: &str| {
            AppError::BadRequest(format!("Attribute '{}' {}", field.name, reason))
        };

        if value.is_null() {
            return Ok(SqlParam::Null);
        }

        match field.semantic_type {
            SemanticType::String => value
                .as_str()
                .map(|s| SqlParam::Text(s.to_string()))
                .ok_or_else(|| invalid("must be a string")),
            SemanticType::Integer => value
                .as_i64()
                .map(SqlParam::Integer)
                .ok_or_else(|| invalid("must be an integer")),
            SemanticType::Byte => value
                .as_i64()
                .filter(|v| i8::try_from(*v).is_ok())
                .map(SqlParam::Integer)
                .ok_or_else(|| invalid("must be an integer between -128 and 127")),
            SemanticType::Date => value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(SqlParam::Date)
                .ok_or_else(|| invalid("must be a date formatted as YYYY-MM-DD")),
            SemanticType::StringArray => value
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .map(SqlParam::TextList)
                .ok_or_else(|| invalid("must be an array of strings")),
        }
    }
}

/// Unified entry INSERT operations using the adapter pattern
pub struct UnifiedEntryInsertOps<T: EntryInserter> {
    inserter: T,
}

impl<T: EntryInserter> UnifiedEntryInsertOps<T> {
    pub fn new(inserter: T) -> Self {
        Self { inserter }
    }

    /// Create a new entry using shared logic and database-specific execution
    pub async fn create_entry(&self, schema: &FilterSchema, entry: &NewCatalogEntry) -> AppResult<i64> {
        let prepared = EntryInsertProcessor::prepare_entry_for_insert(schema, entry)?;
        let translations = prepared.translations.len();

        let id = self.inserter.execute_entry_insert(prepared).await?;
        tracing::info!(
            resource = %schema.resource_type,
            id,
            translations,
            "created catalog entry"
        );

        Ok(id)
    }
}
