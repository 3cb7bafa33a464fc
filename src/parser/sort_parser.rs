use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<SortOrder> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Ascending),
            "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        SortSpec {
            field: field.into(),
            order,
        }
    }

    /// Parse one `sort` parameter: `field` or `field,asc|desc`
    pub fn from_param(param: &str) -> AppResult<SortSpec> {
        let mut parts = param.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default();
        if field.is_empty() {
            return Err(AppError::InvalidSortField(param.to_string()));
        }

        let order = match parts.next() {
            None => SortOrder::Ascending,
            Some(direction) => SortOrder::parse(direction).ok_or_else(|| {
                AppError::BadRequest(format!("Invalid sort direction: {}", direction))
            })?,
        };

        if parts.next().is_some() {
            return Err(AppError::BadRequest(format!(
                "Invalid sort parameter: {}",
                param
            )));
        }

        Ok(SortSpec::new(field.to_lowercase(), order))
    }

    /// Parse every `sort` parameter in request order
    pub fn from_params<'a>(params: impl IntoIterator<Item = &'a str>) -> AppResult<Vec<SortSpec>> {
        params.into_iter().map(SortSpec::from_param).collect()
    }
}
