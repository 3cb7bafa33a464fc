use std::sync::Arc;

use crate::backend::CatalogBackend;
use crate::config::AppConfig;

pub mod catalog;
pub mod health;
pub mod language;

/// Shared handler state
pub type AppState = (Arc<dyn CatalogBackend>, Arc<AppConfig>);
