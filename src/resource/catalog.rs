use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::str::FromStr;

use super::language::resolve_language;
use super::AppState;
use crate::error::AppError;
use crate::extractors::CatalogJson;
use crate::models::{CatalogEntry, LanguageSelector, NewCatalogEntry, Page};
use crate::parser::query_params::LANGUAGE_PARAM;
use crate::parser::{CatalogQuery, ResourceType};

pub const X_TOTAL_COUNT: &str = "x-total-count";
pub const X_TOTAL_PAGES: &str = "x-total-pages";
pub const X_PAGE_NUMBER: &str = "x-page-number";
pub const X_PAGE_SIZE: &str = "x-page-size";

type HandlerError = (StatusCode, Json<Value>);

fn parse_kind(kind: &str) -> Result<ResourceType, HandlerError> {
    ResourceType::from_str(kind).map_err(|e| e.to_response())
}

fn content_language(language: &LanguageSelector) -> HeaderValue {
    HeaderValue::from_str(language.as_str()).unwrap_or_else(|_| HeaderValue::from_static("*"))
}

fn page_headers(page: &Page<CatalogEntry>, page_number: u32, language: &LanguageSelector) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_LANGUAGE, content_language(language));
    for (name, value) in [
        (X_TOTAL_COUNT, page.total_items.to_string()),
        (X_TOTAL_PAGES, page.total_pages.to_string()),
        (X_PAGE_NUMBER, page_number.to_string()),
        (X_PAGE_SIZE, page.page_size.to_string()),
    ] {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}

/// `GET /api/v1/{kind}`: filtered, sorted, paginated search
pub async fn search_entries(
    State((backend, app_config)): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, HandlerError> {
    let resource_type = parse_kind(&kind)?;
    let query = CatalogQuery::from_pairs(params).map_err(|e| e.to_response())?;
    let request = query
        .page_request(&app_config.pagination)
        .map_err(|e| e.to_response())?;
    let language = resolve_language(query.language.as_deref(), &headers, &app_config.localization)
        .map_err(|e| e.to_response())?;

    tracing::debug!(
        resource = %resource_type,
        filter = ?query.filter,
        language = %language,
        page = request.page,
        size = request.size,
        "searching catalog"
    );

    let mut page = backend
        .find_entries_page(resource_type, &query.filter, &language, &request)
        .await
        .map_err(|e| e.to_response())?;

    // Echo the page number the client used
    let page_number = request.page + u32::from(app_config.pagination.one_indexed);
    page.page_number = page_number;

    let headers = page_headers(&page, page_number, &language);
    Ok((StatusCode::OK, headers, Json(page)).into_response())
}

/// `GET /api/v1/{kind}/{id}`
pub async fn get_entry(
    State((backend, app_config)): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, HandlerError> {
    let resource_type = parse_kind(&kind)?;
    let not_found = || AppError::NotFound(format!("{} {} not found", resource_type, id)).to_response();
    let entry_id = id.parse::<i64>().map_err(|_| not_found())?;

    let query_language = params
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(LANGUAGE_PARAM))
        .map(|(_, value)| value.as_str());
    let language = resolve_language(query_language, &headers, &app_config.localization)
        .map_err(|e| e.to_response())?;

    let entry = backend
        .find_entry_by_id(resource_type, entry_id, &language)
        .await
        .map_err(|e| e.to_response())?
        .ok_or_else(not_found)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_LANGUAGE, content_language(&language))],
        Json(entry),
    )
        .into_response())
}

/// `POST /api/v1/{kind}`
pub async fn create_entry(
    State((backend, _)): State<AppState>,
    Path(kind): Path<String>,
    CatalogJson(payload): CatalogJson<NewCatalogEntry>,
) -> Result<Response, HandlerError> {
    let resource_type = parse_kind(&kind)?;

    let entry = backend
        .create_entry(resource_type, &payload)
        .await
        .map_err(|e| e.to_response())?;

    let location = format!("/api/v1/{}/{}", resource_type.path_segment(), entry.id);
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }

    Ok((StatusCode::CREATED, headers, Json(entry)).into_response())
}
