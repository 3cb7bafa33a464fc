use langtag::LangTag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{AppError, AppResult};
use crate::parser::SortSpec;

/// Localized projection of a root entity's textual fields
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Translation {
    pub language: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A catalog entry as returned by the API: root attributes plus the
/// translation rows that matched the request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: i64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    pub translations: Vec<Translation>,
}

/// Payload for creating a catalog entry
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewCatalogEntry {
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub translations: Vec<Translation>,
}

/// Language restriction applied to translation rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelector {
    /// `*`: every language is eligible
    Any,
    Tag(String),
}

impl LanguageSelector {
    pub const ANY: &'static str = "*";

    pub fn parse(value: &str) -> AppResult<LanguageSelector> {
        let value = value.trim();
        if value == Self::ANY {
            return Ok(LanguageSelector::Any);
        }
        if LangTag::new(value).is_err() {
            return Err(AppError::BadRequest(format!(
                "Invalid language tag: {}",
                value
            )));
        }
        Ok(LanguageSelector::Tag(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            LanguageSelector::Any => Self::ANY,
            LanguageSelector::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for LanguageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root identifiers a predicate is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierScope {
    /// No restriction (phase 1)
    Unbounded,
    /// The ordered identifier window selected by phase 1
    Window(Vec<i64>),
}

/// Zero-based page request
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortSpec>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of results. Totals count distinct root entities.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: i64) -> Self {
        let size = i64::from(request.size.max(1));
        Self {
            items,
            page_number: request.page,
            page_size: request.size,
            total_pages: (total_items + size - 1) / size,
            total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_selector_parse() {
        assert_eq!(LanguageSelector::parse("*").unwrap(), LanguageSelector::Any);
        assert_eq!(
            LanguageSelector::parse("en-US").unwrap(),
            LanguageSelector::Tag("en-US".to_string())
        );
        assert!(LanguageSelector::parse("not a tag!").is_err());
    }

    #[test]
    fn test_page_totals() {
        let request = PageRequest::new(0, 10);
        assert_eq!(Page::<i64>::new(vec![], &request, 0).total_pages, 0);
        assert_eq!(Page::<i64>::new(vec![], &request, 10).total_pages, 1);
        assert_eq!(Page::<i64>::new(vec![], &request, 11).total_pages, 2);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
    }

    #[test]
    fn test_entry_serialization_flattens_attributes() {
        let mut attributes = Map::new();
        attributes.insert("duration".to_string(), json!(95));
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Arrival"));

        let entry = CatalogEntry {
            id: 7,
            attributes,
            translations: vec![Translation {
                language: "en-US".to_string(),
                fields,
            }],
        };

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "id": 7,
                "duration": 95,
                "translations": [{"language": "en-US", "name": "Arrival"}]
            })
        );
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec![1, 2], &PageRequest::new(0, 2), 5);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["totalItems"], 5);
        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["pageSize"], 2);
    }
}
