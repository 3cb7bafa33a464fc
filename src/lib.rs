pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod parser;
pub mod resource;
pub mod schema;
pub mod startup;

// Re-export commonly used types for easier access
pub use models::{CatalogEntry, NewCatalogEntry, Page};
pub use startup::{build_router, setup_backend};
