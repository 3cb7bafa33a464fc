//! Catalog field registry
//!
//! Every filterable, sortable and writable attribute of a resource kind is
//! declared here once, together with its semantic type and the table that
//! owns it. The predicate builder, the storage adapters and payload
//! validation all read from these declarations; nothing is discovered at
//! request time.

use crate::error::{AppError, AppResult};
use crate::parser::ResourceType;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Semantic type of a field, driving value coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticType {
    String,
    Integer,
    Byte,
    Date,
    StringArray,
}

impl SemanticType {
    pub fn is_array(&self) -> bool {
        matches!(self, SemanticType::StringArray)
    }
}

/// Table that owns a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOwner {
    Root,
    Translation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterField {
    pub name: &'static str,
    pub semantic_type: SemanticType,
    pub owner: FieldOwner,
    /// Column name in the owning table
    pub column: &'static str,
}

impl FilterField {
    const fn new(
        name: &'static str,
        semantic_type: SemanticType,
        owner: FieldOwner,
    ) -> Self {
        Self {
            name,
            semantic_type,
            owner,
            column: name,
        }
    }

    const fn root(name: &'static str, semantic_type: SemanticType) -> Self {
        Self::new(name, semantic_type, FieldOwner::Root)
    }

    const fn translation(name: &'static str, semantic_type: SemanticType) -> Self {
        Self::new(name, semantic_type, FieldOwner::Translation)
    }

    /// Arrays have no natural order
    pub fn is_sortable(&self) -> bool {
        !self.semantic_type.is_array()
    }
}

/// Immutable field registry for one resource kind
#[derive(Debug, Clone)]
pub struct FilterSchema {
    pub resource_type: ResourceType,
    fields: Vec<FilterField>,
}

impl FilterSchema {
    pub fn new(resource_type: ResourceType, fields: Vec<FilterField>) -> Self {
        Self {
            resource_type,
            fields,
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    pub fn root_fields(&self) -> impl Iterator<Item = &FilterField> {
        self.fields.iter().filter(|f| f.owner == FieldOwner::Root)
    }

    pub fn translation_fields(&self) -> impl Iterator<Item = &FilterField> {
        self.fields
            .iter()
            .filter(|f| f.owner == FieldOwner::Translation)
    }

    /// Resolve a field name, root attributes first, then translation attributes
    pub fn resolve(&self, name: &str) -> AppResult<&FilterField> {
        self.root_fields()
            .find(|f| f.name == name)
            .or_else(|| self.translation_fields().find(|f| f.name == name))
            .ok_or_else(|| AppError::InvalidFilterField {
                field: name.to_string(),
            })
    }

    /// Check the declaration is usable: unique names, SQL-safe column names
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name) {
                return Err(AppError::Configuration(format!(
                    "{} schema declares field '{}' more than once",
                    self.resource_type, field.name
                )));
            }
            if !IDENTIFIER.is_match(field.column) {
                return Err(AppError::Configuration(format!(
                    "{} schema field '{}' has an invalid column name '{}'",
                    self.resource_type, field.name, field.column
                )));
            }
            if RESERVED_COLUMNS.contains(&field.column) {
                return Err(AppError::Configuration(format!(
                    "{} schema field '{}' uses reserved column '{}'",
                    self.resource_type, field.name, field.column
                )));
            }
        }
        Ok(())
    }
}

/// Columns managed by the storage layer itself
const RESERVED_COLUMNS: [&str; 4] = ["id", "language", "created_at", "updated_at"];

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();

    /// Movie schema definition
    pub static ref MOVIE_SCHEMA: FilterSchema = FilterSchema::new(
        ResourceType::Movie,
        vec![
            FilterField::root("duration", SemanticType::Integer),
            FilterField::root("release_date", SemanticType::Date),
            FilterField::root("age_rating", SemanticType::Byte),
            FilterField::root("genres", SemanticType::StringArray),
            FilterField::root("budget", SemanticType::Integer),
            FilterField::translation("name", SemanticType::String),
            FilterField::translation("synopsis", SemanticType::String),
        ],
    );

    /// Series schema definition
    pub static ref SERIES_SCHEMA: FilterSchema = FilterSchema::new(
        ResourceType::Series,
        vec![
            FilterField::root("seasons", SemanticType::Integer),
            FilterField::root("episodes", SemanticType::Integer),
            FilterField::root("first_air_date", SemanticType::Date),
            FilterField::root("age_rating", SemanticType::Byte),
            FilterField::root("genres", SemanticType::StringArray),
            FilterField::translation("name", SemanticType::String),
            FilterField::translation("synopsis", SemanticType::String),
        ],
    );
}

pub fn fields_for(resource_type: ResourceType) -> &'static FilterSchema {
    match resource_type {
        ResourceType::Movie => &*MOVIE_SCHEMA,
        ResourceType::Series => &*SERIES_SCHEMA,
    }
}

/// Validate every declared schema; run once at startup
pub fn validate_schemas() -> AppResult<()> {
    for resource_type in ResourceType::ALL {
        fields_for(resource_type).validate()?;
    }
    Ok(())
}
