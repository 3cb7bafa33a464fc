use crate::error::AppResult;
use crate::models::{IdentifierScope, LanguageSelector};
use crate::parser::RawFilter;
use crate::schema::FilterSchema;

use super::predicate::{build_predicate, Predicate};

/// Dialect hooks used when rendering filter predicates to SQL
///
/// The predicate composition itself is dialect-agnostic and lives in
/// [`build_predicate`]; implementations only describe how their database
/// spells placeholders and multi-valued column tests.
pub trait FilterConverter: Send + Sync {
    /// Get the parameter placeholder for the given 1-based index
    ///
    /// For example:
    /// - PostgreSQL: $1, $2, $3...
    /// - SQLite: ?1, ?2, ?3...
    fn placeholder(&self, index: usize) -> String;

    /// Test whether a single bound token occurs in a multi-valued column
    fn array_contains(&self, column: &str, placeholder: &str) -> String;

    /// Test whether any element of a multi-valued column matches a LIKE pattern
    fn array_any_like(&self, column: &str, placeholder: &str) -> String;

    /// Render a scalar column as text for substring matching
    fn cast_to_text(&self, column: &str) -> String {
        format!("CAST({} AS TEXT)", column)
    }

    /// Convert a filter map to a WHERE condition with bound parameters
    fn to_where_clause(
        &self,
        filter_values: &RawFilter,
        schema: &FilterSchema,
        language: &LanguageSelector,
        scope: &IdentifierScope,
    ) -> AppResult<Predicate>
    where
        Self: Sized,
    {
        build_predicate(self, filter_values, schema, language, scope)
    }
}
