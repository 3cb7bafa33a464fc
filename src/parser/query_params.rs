//! Query string → filter map, page request and language parameter

use std::collections::BTreeMap;

use crate::config::PaginationConfig;
use crate::error::{AppError, AppResult};
use crate::models::PageRequest;
use crate::parser::SortSpec;

/// Field name → raw filter value, one entry per supplied parameter
pub type RawFilter = BTreeMap<String, String>;

pub const PAGE_PARAM: &str = "page";
pub const SIZE_PARAM: &str = "size";
pub const SORT_PARAM: &str = "sort";
pub const LANGUAGE_PARAM: &str = "language";

const RESERVED_PARAMS: [&str; 4] = [PAGE_PARAM, SIZE_PARAM, SORT_PARAM, LANGUAGE_PARAM];

/// A search request split into its filter and control parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub filter: RawFilter,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Vec<String>,
    pub language: Option<String>,
}

const OPERATOR_CHARS: &[char] = &['!', '*', ':', '<', '>'];

/// Re-attach an operator that `key=value` splitting moved into the key.
///
/// `duration>=50` arrives as (`duration>`, `50`), `name!=John` as
/// (`name!`, `John`) and `release_date::a,b` as (`release_date::a,b`, ``).
/// The key is split after its leading run of `[A-Za-z0-9_]` only when the
/// rest starts with an operator symbol; with a value present the rest must
/// consist of operator symbols alone. Any other key is kept whole so that
/// an undeclared name such as `name.first` is reported as such.
pub fn normalize_pair(key: &str, value: &str) -> (String, String) {
    let split = key
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(key.len());
    let (name, tail) = key.split_at(split);

    let raw_value = if tail.is_empty() {
        value.to_string()
    } else if !tail.starts_with(OPERATOR_CHARS) {
        return (key.to_lowercase(), value.to_string());
    } else if value.is_empty() {
        tail.to_string()
    } else if !tail.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
        return (key.to_lowercase(), value.to_string());
    } else if tail == ">" || tail == "<" {
        // the `=` belongs to `>=` / `<=`
        format!("{}={}", tail, value)
    } else {
        // `!=` is NOT_EQUALS; for `*=`, `:=` and the like `=` only separates
        format!("{}{}", tail, value)
    };

    (name.to_lowercase(), raw_value)
}

impl CatalogQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> AppResult<CatalogQuery>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = CatalogQuery::default();

        for (key, value) in pairs {
            let (name, raw_value) = normalize_pair(key.as_ref(), value.as_ref());
            if name.is_empty() {
                return Err(AppError::BadRequest(format!(
                    "Invalid query parameter: {}",
                    key.as_ref()
                )));
            }

            if RESERVED_PARAMS.contains(&name.as_str()) {
                match name.as_str() {
                    PAGE_PARAM => query.page = Some(raw_value),
                    SIZE_PARAM => query.size = Some(raw_value),
                    SORT_PARAM => query.sort.push(raw_value),
                    _ => query.language = Some(raw_value),
                }
                continue;
            }

            if query.filter.contains_key(&name) {
                return Err(AppError::BadRequest(format!(
                    "Filter field supplied more than once: {}",
                    name
                )));
            }
            query.filter.insert(name, raw_value);
        }

        Ok(query)
    }

    /// Build a zero-based page request, clamping the size to the configured maximum
    pub fn page_request(&self, config: &PaginationConfig) -> AppResult<PageRequest> {
        let first_page = u32::from(config.one_indexed);

        let page = match &self.page {
            None => first_page,
            Some(raw) => parse_non_negative(PAGE_PARAM, raw)?,
        };
        if page < first_page {
            return Err(AppError::BadRequest(format!(
                "page must be at least {}",
                first_page
            )));
        }

        let size = match &self.size {
            None => config.default_size,
            Some(raw) => parse_non_negative(SIZE_PARAM, raw)?,
        }
        .clamp(1, config.max_size);

        let sort = SortSpec::from_params(self.sort.iter().map(String::as_str))?;

        Ok(PageRequest::new(page - first_page, size).with_sort(sort))
    }
}

fn parse_non_negative(name: &str, raw: &str) -> AppResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative integer", name)))
}
