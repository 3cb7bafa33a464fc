use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::{BackendFactory, CatalogBackend};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::logging::logging_middleware;
use crate::resource;
use crate::schema::validate_schemas;

/// Validate the field registry, connect storage and create the catalog tables
pub async fn setup_backend(config: &AppConfig) -> AppResult<Arc<dyn CatalogBackend>> {
    validate_schemas()?;

    let backend_config = DatabaseBackendConfig::from_app_config(&config.database)?;
    tracing::info!(database = %config.database.db_type, "setting up backend");

    let backend = BackendFactory::create(&backend_config).await?;
    backend.init_schema().await?;

    Ok(backend)
}

/// Application routes with access logging
pub fn build_router(backend: Arc<dyn CatalogBackend>, config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/health", get(resource::health::health))
        .route(
            "/api/v1/{kind}",
            get(resource::catalog::search_entries).post(resource::catalog::create_entry),
        )
        .route("/api/v1/{kind}/{id}", get(resource::catalog::get_entry))
        .layer(middleware::from_fn(logging_middleware))
        .with_state((backend, config))
}
