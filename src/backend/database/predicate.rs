//! Filter map → conjunctive SQL predicate
//!
//! [`build_predicate`] is a pure function of its arguments: every request
//! builds its own [`Predicate`] and nothing is shared or reset between calls.
//!
//! Queries join the root table (alias `r`) to its translation table (alias
//! `t`) with an inner join, see [`from_clause`]. The predicate is the AND of:
//!
//! 1. `t.language = ?` unless the language selector is `*`
//! 2. one clause per filter entry, rendered from the parsed operator
//! 3. `r.id IN (...)` when the identifier scope is a window

use chrono::NaiveDate;

use super::filter::FilterConverter;
use crate::error::{AppError, AppResult};
use crate::models::{IdentifierScope, LanguageSelector};
use crate::parser::{parse_filter_value, FilterOperator, FilterValue, Operand, ParsedFilter, RawFilter, ResourceType};
use crate::schema::{FieldOwner, FilterField, FilterSchema, SemanticType};

pub const ROOT_ALIAS: &str = "r";
pub const TRANSLATION_ALIAS: &str = "t";

/// A value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    TextList(Vec<String>),
}

impl From<FilterValue> for SqlParam {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Text(v) => SqlParam::Text(v),
            FilterValue::Integer(v) => SqlParam::Integer(v),
            FilterValue::Date(v) => SqlParam::Date(v),
        }
    }
}

/// Conjunction of SQL conditions plus the parameters they reference, in
/// placeholder order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl Predicate {
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// WHERE condition; `1 = 1` when nothing constrains the query
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }

    /// Bind a parameter and return its placeholder
    pub fn bind(&mut self, converter: &dyn FilterConverter, param: SqlParam) -> String {
        self.params.push(param);
        converter.placeholder(self.params.len())
    }

    fn push(&mut self, clause: String) {
        self.clauses.push(clause);
    }
}

/// `FROM` target joining a resource's root table to its translations
pub fn from_clause(resource_type: ResourceType) -> String {
    format!(
        "{root} {r} INNER JOIN {translations} {t} ON {t}.{fk} = {r}.id",
        root = resource_type.root_table(),
        translations = resource_type.translation_table(),
        fk = resource_type.translation_foreign_key(),
        r = ROOT_ALIAS,
        t = TRANSLATION_ALIAS,
    )
}

/// Column reference qualified by the alias of the owning table
pub fn qualified_column(field: &FilterField) -> String {
    let alias = match field.owner {
        FieldOwner::Root => ROOT_ALIAS,
        FieldOwner::Translation => TRANSLATION_ALIAS,
    };
    format!("{}.{}", alias, field.column)
}

/// Compose one conjunctive predicate over root and translation attributes
pub fn build_predicate(
    converter: &dyn FilterConverter,
    filter_values: &RawFilter,
    schema: &FilterSchema,
    language: &LanguageSelector,
    scope: &IdentifierScope,
) -> AppResult<Predicate> {
    let mut predicate = Predicate::default();

    if let LanguageSelector::Tag(tag) = language {
        let placeholder = predicate.bind(converter, SqlParam::Text(tag.clone()));
        predicate.push(format!("{}.language = {}", TRANSLATION_ALIAS, placeholder));
    }

    for (field_name, raw_value) in filter_values {
        let field = schema.resolve(field_name)?;
        let parsed = parse_filter_value(field, raw_value)?;
        let clause = render_filter(converter, &mut predicate, parsed)?;
        predicate.push(clause);
    }

    if let IdentifierScope::Window(ids) = scope {
        let clause = if ids.is_empty() {
            "1 = 0".to_string()
        } else {
            let placeholders = ids
                .iter()
                .map(|id| predicate.bind(converter, SqlParam::Integer(*id)))
                .collect::<Vec<_>>();
            format!("{}.id IN ({})", ROOT_ALIAS, placeholders.join(", "))
        };
        predicate.push(clause);
    }

    tracing::debug!(
        resource = %schema.resource_type,
        language = %language,
        where_clause = %predicate.where_clause(),
        params = predicate.params().len(),
        "built filter predicate"
    );

    Ok(predicate)
}

fn render_filter(
    converter: &dyn FilterConverter,
    predicate: &mut Predicate,
    parsed: ParsedFilter<'_>,
) -> AppResult<String> {
    let column = qualified_column(parsed.field);
    if parsed.field.semantic_type.is_array() {
        render_array_filter(converter, predicate, parsed.field, &column, parsed.operator, parsed.operand)
    } else {
        render_scalar_filter(converter, predicate, parsed.field, &column, parsed.operator, parsed.operand)
    }
}

fn render_scalar_filter(
    converter: &dyn FilterConverter,
    predicate: &mut Predicate,
    field: &FilterField,
    column: &str,
    operator: FilterOperator,
    operand: Operand,
) -> AppResult<String> {
    match (operator, operand) {
        (FilterOperator::Like | FilterOperator::NotLike, Operand::Single(value)) => {
            let text_column = if field.semantic_type == SemanticType::String {
                column.to_string()
            } else {
                converter.cast_to_text(column)
            };
            let placeholder = predicate.bind(converter, like_pattern(value));
            let keyword = if operator == FilterOperator::Like {
                "LIKE"
            } else {
                "NOT LIKE"
            };
            Ok(format!("{} {} {} ESCAPE '\\'", text_column, keyword, placeholder))
        }
        (FilterOperator::Between, Operand::Range(low, high)) => {
            let low = predicate.bind(converter, low.into());
            let high = predicate.bind(converter, high.into());
            Ok(format!("{} BETWEEN {} AND {}", column, low, high))
        }
        (FilterOperator::In | FilterOperator::NotIn, Operand::List(values)) => {
            let placeholders = values
                .into_iter()
                .map(|value| predicate.bind(converter, value.into()))
                .collect::<Vec<_>>()
                .join(", ");
            let membership = format!("{} IN ({})", column, placeholders);
            if operator == FilterOperator::In {
                Ok(membership)
            } else {
                Ok(format!("NOT COALESCE({}, FALSE)", membership))
            }
        }
        (operator, Operand::Single(value)) => {
            let sql_operator = match operator {
                FilterOperator::Equals => "=",
                FilterOperator::NotEquals => "<>",
                FilterOperator::GreaterThan => ">",
                FilterOperator::GreaterOrEqual => ">=",
                FilterOperator::LessThan => "<",
                FilterOperator::LessOrEqual => "<=",
                other => return Err(unsupported(field, other)),
            };
            let placeholder = predicate.bind(converter, value.into());
            Ok(format!("{} {} {}", column, sql_operator, placeholder))
        }
        (operator, _) => Err(unsupported(field, operator)),
    }
}

/// Multi-valued columns: membership is tested token by token, and a
/// multi-token IN requires every token to be present (all-of)
fn render_array_filter(
    converter: &dyn FilterConverter,
    predicate: &mut Predicate,
    field: &FilterField,
    column: &str,
    operator: FilterOperator,
    operand: Operand,
) -> AppResult<String> {
    match (operator, operand) {
        (FilterOperator::Equals, Operand::Single(value)) => {
            let placeholder = predicate.bind(converter, value.into());
            Ok(converter.array_contains(column, &placeholder))
        }
        (FilterOperator::NotEquals, Operand::Single(value)) => {
            let placeholder = predicate.bind(converter, value.into());
            Ok(format!("NOT {}", converter.array_contains(column, &placeholder)))
        }
        (FilterOperator::Like, Operand::Single(value)) => {
            let placeholder = predicate.bind(converter, like_pattern(value));
            Ok(converter.array_any_like(column, &placeholder))
        }
        (FilterOperator::NotLike, Operand::Single(value)) => {
            let placeholder = predicate.bind(converter, like_pattern(value));
            Ok(format!("NOT {}", converter.array_any_like(column, &placeholder)))
        }
        (FilterOperator::In | FilterOperator::NotIn, Operand::List(values)) => {
            let all_of = values
                .into_iter()
                .map(|value| {
                    let placeholder = predicate.bind(converter, value.into());
                    converter.array_contains(column, &placeholder)
                })
                .collect::<Vec<_>>()
                .join(" AND ");
            if operator == FilterOperator::In {
                Ok(format!("({})", all_of))
            } else {
                Ok(format!("NOT ({})", all_of))
            }
        }
        (operator, _) => Err(unsupported(field, operator)),
    }
}

fn unsupported(field: &FilterField, operator: FilterOperator) -> AppError {
    AppError::invalid_value(
        field.name,
        format!("operator '{}' is not supported here", operator.symbol()),
    )
}

/// Substring pattern with LIKE metacharacters escaped
fn like_pattern(value: FilterValue) -> SqlParam {
    let text = match value {
        FilterValue::Text(text) => text,
        FilterValue::Integer(v) => v.to_string(),
        FilterValue::Date(v) => v.format("%Y-%m-%d").to_string(),
    };
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    SqlParam::Text(format!("%{}%", escaped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fields_for;

    /// Minimal dialect with SQLite-style placeholders
    struct TestConverter;

    impl FilterConverter for TestConverter {
        fn placeholder(&self, index: usize) -> String {
            format!("?{}", index)
        }

        fn array_contains(&self, column: &str, placeholder: &str) -> String {
            format!("CONTAINS({}, {})", column, placeholder)
        }

        fn array_any_like(&self, column: &str, placeholder: &str) -> String {
            format!("ANY_LIKE({}, {})", column, placeholder)
        }
    }

    fn filter(pairs: &[(&str, &str)]) -> RawFilter {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn build(
        pairs: &[(&str, &str)],
        language: LanguageSelector,
        scope: IdentifierScope,
    ) -> AppResult<Predicate> {
        build_predicate(
            &TestConverter,
            &filter(pairs),
            fields_for(ResourceType::Movie),
            &language,
            &scope,
        )
    }

    fn en_us() -> LanguageSelector {
        LanguageSelector::Tag("en-US".to_string())
    }

    #[test]
    fn test_language_clause_and_equals() {
        let predicate = build(&[("name", "John")], en_us(), IdentifierScope::Unbounded).unwrap();
        assert_eq!(predicate.where_clause(), "t.language = ?1 AND t.name = ?2");
        assert_eq!(
            predicate.params(),
            &[
                SqlParam::Text("en-US".to_string()),
                SqlParam::Text("John".to_string())
            ]
        );
    }

    #[test]
    fn test_any_language_omits_language_clause() {
        let predicate =
            build(&[], LanguageSelector::Any, IdentifierScope::Unbounded).unwrap();
        assert!(predicate.clauses().is_empty());
        assert_eq!(predicate.where_clause(), "1 = 1");
    }

    #[test]
    fn test_between_is_inclusive() {
        let predicate =
            build(&[("duration", "::50,60")], LanguageSelector::Any, IdentifierScope::Unbounded)
                .unwrap();
        assert_eq!(predicate.where_clause(), "r.duration BETWEEN ?1 AND ?2");
        assert_eq!(
            predicate.params(),
            &[SqlParam::Integer(50), SqlParam::Integer(60)]
        );
    }

    #[test]
    fn test_scalar_in_is_any_of() {
        let predicate =
            build(&[("duration", ":90,120")], LanguageSelector::Any, IdentifierScope::Unbounded)
                .unwrap();
        assert_eq!(predicate.where_clause(), "r.duration IN (?1, ?2)");

        let predicate =
            build(&[("duration", "!:90,120")], LanguageSelector::Any, IdentifierScope::Unbounded)
                .unwrap();
        assert_eq!(
            predicate.where_clause(),
            "NOT COALESCE(r.duration IN (?1, ?2), FALSE)"
        );
    }

    #[test]
    fn test_array_in_is_all_of() {
        let predicate = build(
            &[("genres", ":Drama,Horror")],
            LanguageSelector::Any,
            IdentifierScope::Unbounded,
        )
        .unwrap();
        assert_eq!(
            predicate.where_clause(),
            "(CONTAINS(r.genres, ?1) AND CONTAINS(r.genres, ?2))"
        );

        let predicate = build(
            &[("genres", "!:Drama,Horror")],
            LanguageSelector::Any,
            IdentifierScope::Unbounded,
        )
        .unwrap();
        assert_eq!(
            predicate.where_clause(),
            "NOT (CONTAINS(r.genres, ?1) AND CONTAINS(r.genres, ?2))"
        );
    }

    #[test]
    fn test_like_escapes_metacharacters() {
        let predicate =
            build(&[("name", "*50%_off")], LanguageSelector::Any, IdentifierScope::Unbounded)
                .unwrap();
        assert_eq!(predicate.where_clause(), "t.name LIKE ?1 ESCAPE '\\'");
        assert_eq!(
            predicate.params(),
            &[SqlParam::Text("%50\\%\\_off%".to_string())]
        );
    }

    #[test]
    fn test_like_on_typed_column_casts_to_text() {
        let predicate =
            build(&[("duration", "!*9")], LanguageSelector::Any, IdentifierScope::Unbounded)
                .unwrap();
        assert_eq!(
            predicate.where_clause(),
            "CAST(r.duration AS TEXT) NOT LIKE ?1 ESCAPE '\\'"
        );
    }

    #[test]
    fn test_window_scope_is_last_clause() {
        let predicate = build(
            &[("age_rating", "<=12")],
            en_us(),
            IdentifierScope::Window(vec![4, 2, 9]),
        )
        .unwrap();
        assert_eq!(
            predicate.where_clause(),
            "t.language = ?1 AND r.age_rating <= ?2 AND r.id IN (?3, ?4, ?5)"
        );
        assert_eq!(predicate.params()[2..], [
            SqlParam::Integer(4),
            SqlParam::Integer(2),
            SqlParam::Integer(9)
        ]);
    }

    #[test]
    fn test_empty_window_matches_nothing() {
        let predicate =
            build(&[], LanguageSelector::Any, IdentifierScope::Window(vec![])).unwrap();
        assert_eq!(predicate.where_clause(), "1 = 0");
    }

    #[test]
    fn test_unknown_field_is_invalid_filter_field() {
        let err = build(&[("foo", "bar")], en_us(), IdentifierScope::Unbounded).unwrap_err();
        assert!(matches!(err, AppError::InvalidFilterField { field } if field == "foo"));
    }

    #[test]
    fn test_bad_value_is_invalid_filter_value() {
        let err = build(&[("duration", "::50")], en_us(), IdentifierScope::Unbounded).unwrap_err();
        assert!(matches!(err, AppError::InvalidFilterValue { field, .. } if field == "duration"));
    }

    #[test]
    fn test_repeated_builds_do_not_share_state() {
        let first = build(&[("name", "A")], en_us(), IdentifierScope::Unbounded).unwrap();
        let second = build(&[("duration", "90")], en_us(), IdentifierScope::Unbounded).unwrap();
        assert_eq!(first.where_clause(), "t.language = ?1 AND t.name = ?2");
        assert_eq!(second.where_clause(), "t.language = ?1 AND r.duration = ?2");
    }

    #[test]
    fn test_from_clause() {
        assert_eq!(
            from_clause(ResourceType::Series),
            "series r INNER JOIN series_translations t ON t.series_id = r.id"
        );
    }
}
