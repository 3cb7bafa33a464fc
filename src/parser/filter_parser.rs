use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
pub use crate::parser::filter_operator::FilterOperator;
use crate::schema::{FilterField, SemanticType};

/// A filter value coerced to its field's semantic type
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

/// Operand shape demanded by the operator
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(FilterValue),
    List(Vec<FilterValue>),
    /// Inclusive on both ends
    Range(FilterValue, FilterValue),
}

/// One `field=rawValue` pair after operator detection and coercion
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilter<'a> {
    pub field: &'a FilterField,
    pub operator: FilterOperator,
    pub operand: Operand,
}

const LIST_SEPARATOR: char = ',';

/// Parse a raw filter value against the declared field
pub fn parse_filter_value<'a>(field: &'a FilterField, raw_value: &str) -> AppResult<ParsedFilter<'a>> {
    let (operator, residual) = FilterOperator::detect(raw_value);

    if field.semantic_type.is_array()
        && (operator.is_comparison() || operator == FilterOperator::Between)
    {
        return Err(AppError::invalid_value(
            field.name,
            format!(
                "operator '{}' is not supported on multi-valued fields",
                operator.symbol()
            ),
        ));
    }

    let operand = match operator {
        FilterOperator::In | FilterOperator::NotIn => {
            let values = split_list(field, residual)?
                .into_iter()
                .map(|token| coerce(field, token))
                .collect::<AppResult<Vec<_>>>()?;
            Operand::List(values)
        }
        FilterOperator::Between => {
            let bounds = split_list(field, residual)?;
            if bounds.len() != 2 {
                return Err(AppError::invalid_value(
                    field.name,
                    format!(
                        "between expects exactly two bounds separated by '{}', got {}",
                        LIST_SEPARATOR,
                        bounds.len()
                    ),
                ));
            }
            Operand::Range(coerce(field, bounds[0])?, coerce(field, bounds[1])?)
        }
        // Substring search always compares text, whatever the column type
        FilterOperator::Like | FilterOperator::NotLike => {
            Operand::Single(FilterValue::Text(residual.to_string()))
        }
        _ => Operand::Single(coerce(field, residual)?),
    };

    Ok(ParsedFilter {
        field,
        operator,
        operand,
    })
}

fn split_list<'v>(field: &FilterField, residual: &'v str) -> AppResult<Vec<&'v str>> {
    let tokens: Vec<&str> = residual.split(LIST_SEPARATOR).map(str::trim).collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(AppError::invalid_value(
            field.name,
            format!("empty element in list '{}'", residual),
        ));
    }
    Ok(tokens)
}

/// Coerce one token to the field's semantic type
pub fn coerce(field: &FilterField, token: &str) -> AppResult<FilterValue> {
    match field.semantic_type {
        SemanticType::String | SemanticType::StringArray => Ok(FilterValue::Text(token.to_string())),
        SemanticType::Integer => token
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| AppError::invalid_value(field.name, format!("'{}' is not an integer", token))),
        SemanticType::Byte => token
            .parse::<i8>()
            .map(|v| FilterValue::Integer(i64::from(v)))
            .map_err(|_| {
                AppError::invalid_value(
                    field.name,
                    format!("'{}' is not a byte (-128..=127)", token),
                )
            }),
        SemanticType::Date => NaiveDate::parse_from_str(token, "%Y-%m-%d")
            .map(FilterValue::Date)
            .map_err(|_| {
                AppError::invalid_value(
                    field.name,
                    format!("'{}' is not an ISO date (YYYY-MM-DD)", token),
                )
            }),
    }
}
