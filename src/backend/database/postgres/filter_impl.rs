use super::super::filter::FilterConverter;

/// PostgreSQL-specific filter converter
///
/// String arrays are native `TEXT[]` columns.
pub struct PostgresFilterConverter;

impl PostgresFilterConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresFilterConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConverter for PostgresFilterConverter {
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn array_contains(&self, column: &str, placeholder: &str) -> String {
        // array_position is NULL-safe where `= ANY` would yield NULL
        format!("array_position({}, {}) IS NOT NULL", column, placeholder)
    }

    fn array_any_like(&self, column: &str, placeholder: &str) -> String {
        format!(
            "EXISTS (SELECT 1 FROM unnest({}) AS g WHERE g LIKE {} ESCAPE '\\')",
            column, placeholder
        )
    }
}
