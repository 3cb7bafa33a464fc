use crate::error::{AppError, AppResult};
use crate::models::NewCatalogEntry;
use langtag::LangTag;
use serde_json::Value;
use std::collections::HashSet;

use super::definitions::FilterSchema;

/// Translation field every entry must carry in each language
pub const REQUIRED_TRANSLATION_FIELD: &str = "name";

/// Validates locale format according to RFC 5646 (BCP 47)
/// Language tags like "en", "en-US", "zh-Hans-CN", etc.
pub fn validate_locale(locale: &str) -> bool {
    LangTag::new(locale).is_ok()
}

/// Validates the structure of a create payload against the resource's field
/// registry. Value types are checked when the payload is coerced for storage.
pub fn validate_entry(schema: &FilterSchema, entry: &NewCatalogEntry) -> AppResult<()> {
    for name in entry.attributes.keys() {
        if !schema.root_fields().any(|f| f.name == name.as_str()) {
            return Err(AppError::BadRequest(format!("Unknown attribute: {}", name)));
        }
    }

    if entry.translations.is_empty() {
        return Err(AppError::BadRequest(
            "At least one translation is required".to_string(),
        ));
    }

    let mut languages = HashSet::new();
    for translation in &entry.translations {
        if !validate_locale(&translation.language) {
            return Err(AppError::BadRequest(format!(
                "Invalid language tag: {}",
                translation.language
            )));
        }
        if !languages.insert(translation.language.to_lowercase()) {
            return Err(AppError::BadRequest(format!(
                "Duplicate translation language: {}",
                translation.language
            )));
        }

        for name in translation.fields.keys() {
            if !schema.translation_fields().any(|f| f.name == name.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "Unknown translation attribute: {}",
                    name
                )));
            }
        }

        let name = translation
            .fields
            .get(REQUIRED_TRANSLATION_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if name.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Translation '{}' requires a non-empty {}",
                translation.language, REQUIRED_TRANSLATION_FIELD
            )));
        }
    }

    Ok(())
}
