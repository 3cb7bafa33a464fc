use super::super::filter::FilterConverter;

/// SQLite-specific filter converter
///
/// String arrays are stored as JSON text, so element tests go through
/// `json_each`.
pub struct SqliteFilterConverter;

impl SqliteFilterConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteFilterConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConverter for SqliteFilterConverter {
    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }

    fn array_contains(&self, column: &str, placeholder: &str) -> String {
        format!(
            "EXISTS (SELECT 1 FROM json_each({}) WHERE json_each.value = {})",
            column, placeholder
        )
    }

    fn array_any_like(&self, column: &str, placeholder: &str) -> String {
        format!(
            "EXISTS (SELECT 1 FROM json_each({}) WHERE json_each.value LIKE {} ESCAPE '\\')",
            column, placeholder
        )
    }
}
