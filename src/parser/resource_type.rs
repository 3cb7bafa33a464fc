use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Catalog resource kinds served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Movie,
    Series,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [ResourceType::Movie, ResourceType::Series];

    /// Path segment used in `/api/v1/{kind}`
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceType::Movie => "movies",
            ResourceType::Series => "series",
        }
    }

    pub fn root_table(&self) -> &'static str {
        match self {
            ResourceType::Movie => "movies",
            ResourceType::Series => "series",
        }
    }

    pub fn translation_table(&self) -> &'static str {
        match self {
            ResourceType::Movie => "movie_translations",
            ResourceType::Series => "series_translations",
        }
    }

    /// Foreign key column on the translation table pointing at the root row
    pub fn translation_foreign_key(&self) -> &'static str {
        match self {
            ResourceType::Movie => "movie_id",
            ResourceType::Series => "series_id",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Movie => write!(f, "Movie"),
            ResourceType::Series => write!(f, "Series"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.path_segment().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::NotFound(format!("Unknown resource kind: {}", s)))
    }
}
