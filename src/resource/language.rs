//! Language resolution for catalog requests

use axum::http::{header, HeaderMap};

use crate::config::LocalizationConfig;
use crate::error::AppResult;
use crate::models::LanguageSelector;

/// First language range of an `Accept-Language` header, quality ignored
fn preferred_language(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|range| range.split(';').next())
        .map(str::trim)
        .filter(|range| !range.is_empty())
}

/// Resolve the language selector for a request: the `language` query
/// parameter, then `Accept-Language`, then the configured default.
///
/// An invalid query parameter is a client error. An unusable
/// `Accept-Language` header falls back to the default.
pub fn resolve_language(
    query_language: Option<&str>,
    headers: &HeaderMap,
    localization: &LocalizationConfig,
) -> AppResult<LanguageSelector> {
    if let Some(language) = query_language {
        return LanguageSelector::parse(language);
    }

    if let Some(selector) = preferred_language(headers).and_then(|tag| LanguageSelector::parse(tag).ok()) {
        return Ok(selector);
    }

    LanguageSelector::parse(&localization.default_language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn localization() -> LocalizationConfig {
        LocalizationConfig {
            default_language: "en-US".to_string(),
        }
    }

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_query_parameter_wins() {
        let selector =
            resolve_language(Some("*"), &accept("es-ES"), &localization()).unwrap();
        assert_eq!(selector, LanguageSelector::Any);
    }

    #[test]
    fn test_accept_language_first_range() {
        let selector =
            resolve_language(None, &accept("fr-CA;q=0.9, en;q=0.5"), &localization()).unwrap();
        assert_eq!(selector, LanguageSelector::Tag("fr-CA".to_string()));
    }

    #[test]
    fn test_default_language() {
        let selector = resolve_language(None, &HeaderMap::new(), &localization()).unwrap();
        assert_eq!(selector, LanguageSelector::Tag("en-US".to_string()));

        let selector = resolve_language(None, &accept("!!"), &localization()).unwrap();
        assert_eq!(selector, LanguageSelector::Tag("en-US".to_string()));
    }

    #[test]
    fn test_invalid_query_language_is_rejected() {
        assert!(resolve_language(Some("not a tag"), &HeaderMap::new(), &localization()).is_err());
    }
}
