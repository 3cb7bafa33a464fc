//! Catalog entry read operations
//!
//! Paging over a root ⋈ translation join cannot use LIMIT/OFFSET on the
//! joined rows: one root fans out into one row per matching translation and
//! a page boundary would split an entity. Reads therefore run in two phases
//! inside one read transaction:
//!
//! 1. select the ordered window of distinct root identifiers for the page,
//!    and count distinct matching roots
//! 2. re-run the same predicate restricted to that window and fetch the
//!    full projection, then restore the phase-1 order
//!
//! SQL generation and row grouping are shared here. Each database supplies
//! a [`EntryReader`] that opens a [`ReadSession`] and decodes rows.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::filter::FilterConverter;
use super::predicate::{build_predicate, from_clause, qualified_column, SqlParam, ROOT_ALIAS, TRANSLATION_ALIAS};
use crate::error::{AppError, AppResult};
use crate::models::{CatalogEntry, IdentifierScope, LanguageSelector, Page, PageRequest, Translation};
use crate::parser::{RawFilter, SortOrder, SortSpec};
use crate::schema::FilterSchema;

/// SQL text with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// One phase-2 row: a root entity joined to one of its translations
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub id: i64,
    pub attributes: Map<String, Value>,
    pub language: String,
    pub translation: Map<String, Value>,
}

/// Statements issued inside one read transaction
#[async_trait]
pub trait ReadSession: Send {
    /// Count distinct matching roots
    async fn count_items(&mut self, statement: &Statement) -> AppResult<i64>;

    /// Phase 1: ordered identifier window
    async fn select_window(&mut self, statement: &Statement) -> AppResult<Vec<i64>>;

    /// Phase 2: root × translation rows for a window
    async fn fetch_projections(
        &mut self,
        statement: &Statement,
        schema: &FilterSchema,
    ) -> AppResult<Vec<ProjectionRow>>;

    /// Commit and release the connection
    async fn finish(self: Box<Self>) -> AppResult<()>;
}

/// Database-specific adapter for catalog reads
#[async_trait]
pub trait EntryReader: Send + Sync {
    fn converter(&self) -> &dyn FilterConverter;

    /// Open a read-consistent session
    async fn begin_read(&self) -> AppResult<Box<dyn ReadSession>>;
}

/// Shared SQL generation and row assembly for catalog reads
pub struct EntryReadProcessor;

impl EntryReadProcessor {
    /// ORDER BY for phase 1. Rows are grouped by root id, so each sort key
    /// is aggregated: the smallest value when ascending, the largest when
    /// descending. `r.id` always breaks ties.
    pub fn order_by(schema: &FilterSchema, sort: &[SortSpec]) -> AppResult<String> {
        let mut terms = Vec::with_capacity(sort.len() + 1);
        for spec in sort {
            let field = schema
                .resolve(&spec.field)
                .ok()
                .filter(|field| field.is_sortable())
                .ok_or_else(|| AppError::InvalidSortField(spec.field.clone()))?;
            let aggregate = match spec.order {
                SortOrder::Ascending => "MIN",
                SortOrder::Descending => "MAX",
            };
            terms.push(format!(
                "{}({}) {}",
                aggregate,
                qualified_column(field),
                spec.order.as_sql()
            ));
        }
        terms.push(format!("{}.id ASC", ROOT_ALIAS));
        Ok(terms.join(", "))
    }

    /// Phase-1 statement selecting the page's identifier window
    pub fn window_statement(
        converter: &dyn FilterConverter,
        schema: &FilterSchema,
        filter: &RawFilter,
        language: &LanguageSelector,
        request: &PageRequest,
    ) -> AppResult<Statement> {
        let mut predicate =
            build_predicate(converter, filter, schema, language, &IdentifierScope::Unbounded)?;
        let order_by = Self::order_by(schema, &request.sort)?;
        let limit = predicate.bind(converter, SqlParam::Integer(request.limit()));
        let offset = predicate.bind(converter, SqlParam::Integer(request.offset()));

        let sql = format!(
            "SELECT {r}.id FROM {from} WHERE {condition} GROUP BY {r}.id ORDER BY {order_by} LIMIT {limit} OFFSET {offset}",
            r = ROOT_ALIAS,
            from = from_clause(schema.resource_type),
            condition = predicate.where_clause(),
        );

        Ok(Statement {
            sql,
            params: predicate.params().to_vec(),
        })
    }

    /// Distinct-root count under the same predicate as phase 1
    pub fn count_statement(
        converter: &dyn FilterConverter,
        schema: &FilterSchema,
        filter: &RawFilter,
        language: &LanguageSelector,
    ) -> AppResult<Statement> {
        let predicate =
            build_predicate(converter, filter, schema, language, &IdentifierScope::Unbounded)?;
        let sql = format!(
            "SELECT COUNT(DISTINCT {r}.id) FROM {from} WHERE {condition}",
            r = ROOT_ALIAS,
            from = from_clause(schema.resource_type),
            condition = predicate.where_clause(),
        );

        Ok(Statement {
            sql,
            params: predicate.params().to_vec(),
        })
    }

    /// Phase-2 statement: the same filter restricted to an identifier window
    pub fn projection_statement(
        converter: &dyn FilterConverter,
        schema: &FilterSchema,
        filter: &RawFilter,
        language: &LanguageSelector,
        ids: &[i64],
    ) -> AppResult<Statement> {
        let predicate = build_predicate(
            converter,
            filter,
            schema,
            language,
            &IdentifierScope::Window(ids.to_vec()),
        )?;

        let mut columns = vec![format!("{}.id AS id", ROOT_ALIAS)];
        columns.extend(
            schema
                .root_fields()
                .map(|field| format!("{} AS {}", qualified_column(field), field.column)),
        );
        columns.push(format!("{}.language AS language", TRANSLATION_ALIAS));
        columns.extend(
            schema
                .translation_fields()
                .map(|field| format!("{} AS {}", qualified_column(field), field.column)),
        );

        let sql = format!(
            "SELECT {columns} FROM {from} WHERE {condition} ORDER BY {r}.id ASC, {t}.language ASC",
            columns = columns.join(", "),
            from = from_clause(schema.resource_type),
            condition = predicate.where_clause(),
            r = ROOT_ALIAS,
            t = TRANSLATION_ALIAS,
        );

        Ok(Statement {
            sql,
            params: predicate.params().to_vec(),
        })
    }

    /// Group projection rows by root and order the entries like `window`.
    /// Roots missing from `rows` are dropped; rows outside `window` are ignored.
    pub fn assemble(window: &[i64], rows: Vec<ProjectionRow>) -> Vec<CatalogEntry> {
        let mut grouped: HashMap<i64, CatalogEntry> = HashMap::with_capacity(window.len());
        for row in rows {
            let entry = grouped.entry(row.id).or_insert_with(|| CatalogEntry {
                id: row.id,
                attributes: row.attributes,
                translations: Vec::new(),
            });
            entry.translations.push(Translation {
                language: row.language,
                fields: row.translation,
            });
        }

        window
            .iter()
            .filter_map(|id| grouped.remove(id))
            .collect()
    }
}

/// Unified catalog read operations using the adapter pattern
pub struct UnifiedEntryReadOps<T: EntryReader> {
    reader: T,
}

impl<T: EntryReader> UnifiedEntryReadOps<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }

    /// Two-phase paginated search
    pub async fn find_page(
        &self,
        schema: &FilterSchema,
        filter: &RawFilter,
        language: &LanguageSelector,
        request: &PageRequest,
    ) -> AppResult<Page<CatalogEntry>> {
        let converter = self.reader.converter();

        // Build both phase-1 statements before touching storage so that
        // malformed filters and sort keys fail without a transaction.
        let count = EntryReadProcessor::count_statement(converter, schema, filter, language)?;
        let window = EntryReadProcessor::window_statement(converter, schema, filter, language, request)?;

        let mut session = self.reader.begin_read().await?;
        let total_items = session.count_items(&count).await?;
        let ids = session.select_window(&window).await?;

        if ids.is_empty() {
            session.finish().await?;
            tracing::debug!(
                resource = %schema.resource_type,
                total_items,
                page = request.page,
                "identifier window is empty"
            );
            return Ok(Page::new(Vec::new(), request, total_items));
        }

        let projection =
            EntryReadProcessor::projection_statement(converter, schema, filter, language, &ids)?;
        let rows = session.fetch_projections(&projection, schema).await?;
        session.finish().await?;

        let items = EntryReadProcessor::assemble(&ids, rows);
        tracing::debug!(
            resource = %schema.resource_type,
            total_items,
            page = request.page,
            items = items.len(),
            "read catalog page"
        );

        Ok(Page::new(items, request, total_items))
    }

    /// Fetch one entry with its translations in the selected language
    pub async fn find_entry_by_id(
        &self,
        schema: &FilterSchema,
        id: i64,
        language: &LanguageSelector,
    ) -> AppResult<Option<CatalogEntry>> {
        let projection = EntryReadProcessor::projection_statement(
            self.reader.converter(),
            schema,
            &RawFilter::new(),
            language,
            &[id],
        )?;

        let mut session = self.reader.begin_read().await?;
        let rows = session.fetch_projections(&projection, schema).await?;
        session.finish().await?;

        Ok(EntryReadProcessor::assemble(&[id], rows).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ResourceType;
    use crate::schema::fields_for;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct TestConverter;

    impl FilterConverter for TestConverter {
        fn placeholder(&self, index: usize) -> String {
            format!("${}", index)
        }

        fn array_contains(&self, column: &str, placeholder: &str) -> String {
            format!("{} = ANY({})", placeholder, column)
        }

        fn array_any_like(&self, column: &str, placeholder: &str) -> String {
            format!("ANY_LIKE({}, {})", column, placeholder)
        }
    }

    fn movies() -> &'static FilterSchema {
        fields_for(ResourceType::Movie)
    }

    fn row(id: i64, language: &str, name: &str) -> ProjectionRow {
        let mut attributes = Map::new();
        attributes.insert("duration".to_string(), json!(id * 10));
        let mut translation = Map::new();
        translation.insert("name".to_string(), json!(name));
        ProjectionRow {
            id,
            attributes,
            language: language.to_string(),
            translation,
        }
    }

    #[test]
    fn test_order_by_defaults_to_id() {
        assert_eq!(EntryReadProcessor::order_by(movies(), &[]).unwrap(), "r.id ASC");
    }

    #[test]
    fn test_order_by_aggregates_sort_keys() {
        let sort = vec![
            SortSpec::new("name", SortOrder::Ascending),
            SortSpec::new("duration", SortOrder::Descending),
        ];
        assert_eq!(
            EntryReadProcessor::order_by(movies(), &sort).unwrap(),
            "MIN(t.name) ASC, MAX(r.duration) DESC, r.id ASC"
        );
    }

    #[test]
    fn test_order_by_rejects_unknown_and_array_fields() {
        for field in ["foo", "genres", "language"] {
            let sort = vec![SortSpec::new(field, SortOrder::Ascending)];
            assert!(matches!(
                EntryReadProcessor::order_by(movies(), &sort),
                Err(AppError::InvalidSortField(f)) if f == field
            ));
        }
    }

    #[test]
    fn test_window_statement() {
        let mut filter = RawFilter::new();
        filter.insert("duration".to_string(), ">=50".to_string());
        let request = PageRequest::new(2, 10);

        let statement = EntryReadProcessor::window_statement(
            &TestConverter,
            movies(),
            &filter,
            &LanguageSelector::Tag("en-US".to_string()),
            &request,
        )
        .unwrap();

        assert_eq!(
            statement.sql,
            "SELECT r.id FROM movies r INNER JOIN movie_translations t ON t.movie_id = r.id \
             WHERE t.language = $1 AND r.duration >= $2 GROUP BY r.id ORDER BY r.id ASC LIMIT $3 OFFSET $4"
        );
        assert_eq!(
            statement.params,
            vec![
                SqlParam::Text("en-US".to_string()),
                SqlParam::Integer(50),
                SqlParam::Integer(10),
                SqlParam::Integer(20),
            ]
        );
    }

    #[test]
    fn test_count_statement_counts_distinct_roots() {
        let statement = EntryReadProcessor::count_statement(
            &TestConverter,
            movies(),
            &RawFilter::new(),
            &LanguageSelector::Any,
        )
        .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT COUNT(DISTINCT r.id) FROM movies r INNER JOIN movie_translations t ON t.movie_id = r.id WHERE 1 = 1"
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn test_projection_statement_restricts_to_window() {
        let statement = EntryReadProcessor::projection_statement(
            &TestConverter,
            fields_for(ResourceType::Series),
            &RawFilter::new(),
            &LanguageSelector::Any,
            &[3, 1],
        )
        .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT r.id AS id, r.seasons AS seasons, r.episodes AS episodes, \
             r.first_air_date AS first_air_date, r.age_rating AS age_rating, r.genres AS genres, \
             t.language AS language, t.name AS name, t.synopsis AS synopsis \
             FROM series r INNER JOIN series_translations t ON t.series_id = r.id \
             WHERE r.id IN ($1, $2) ORDER BY r.id ASC, t.language ASC"
        );
        assert_eq!(statement.params, vec![SqlParam::Integer(3), SqlParam::Integer(1)]);
    }

    #[test]
    fn test_assemble_groups_and_restores_window_order() {
        let rows = vec![
            row(1, "en-US", "One"),
            row(1, "es-ES", "Uno"),
            row(2, "en-US", "Two"),
            row(3, "en-US", "Three"),
        ];
        let entries = EntryReadProcessor::assemble(&[3, 1, 2], rows);

        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(entries[1].translations.len(), 2);
        assert_eq!(entries[1].translations[1].language, "es-ES");
        assert_eq!(entries[0].attributes["duration"], json!(30));
    }

    /// Replays canned results and records the statements it was given
    struct FakeSession {
        total: i64,
        window: Vec<i64>,
        rows: Vec<ProjectionRow>,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ReadSession for FakeSession {
        async fn count_items(&mut self, statement: &Statement) -> AppResult<i64> {
            self.log.lock().unwrap().push(statement.sql.clone());
            Ok(self.total)
        }

        async fn select_window(&mut self, statement: &Statement) -> AppResult<Vec<i64>> {
            self.log.lock().unwrap().push(statement.sql.clone());
            Ok(self.window.clone())
        }

        async fn fetch_projections(
            &mut self,
            statement: &Statement,
            _schema: &FilterSchema,
        ) -> AppResult<Vec<ProjectionRow>> {
            self.log.lock().unwrap().push(statement.sql.clone());
            Ok(std::mem::take(&mut self.rows))
        }

        async fn finish(self: Box<Self>) -> AppResult<()> {
            self.log.lock().unwrap().push("COMMIT".to_string());
            Ok(())
        }
    }

    struct FakeReader {
        total: i64,
        window: Vec<i64>,
        rows: Vec<ProjectionRow>,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EntryReader for FakeReader {
        fn converter(&self) -> &dyn FilterConverter {
            &TestConverter
        }

        async fn begin_read(&self) -> AppResult<Box<dyn ReadSession>> {
            Ok(Box::new(FakeSession {
                total: self.total,
                window: self.window.clone(),
                rows: self.rows.clone(),
                log: self.log.clone(),
            }))
        }
    }

    fn fake_ops(total: i64, window: Vec<i64>, rows: Vec<ProjectionRow>) -> (UnifiedEntryReadOps<FakeReader>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reader = FakeReader {
            total,
            window,
            rows,
            log: log.clone(),
        };
        (UnifiedEntryReadOps::new(reader), log)
    }

    #[tokio::test]
    async fn test_find_page_runs_both_phases_in_one_session() {
        let rows = vec![
            row(4, "en-US", "Four"),
            row(7, "en-US", "Seven"),
            row(7, "fr-FR", "Sept"),
        ];
        let (ops, log) = fake_ops(12, vec![7, 4], rows);

        let page = ops
            .find_page(
                movies(),
                &RawFilter::new(),
                &LanguageSelector::Any,
                &PageRequest::new(1, 2),
            )
            .await
            .unwrap();

        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 6);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![7, 4]);
        assert_eq!(page.items[0].translations.len(), 2);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 4);
        assert!(log[0].starts_with("SELECT COUNT(DISTINCT r.id)"));
        assert!(log[1].contains("GROUP BY r.id"));
        assert!(log[2].contains("r.id IN ($1, $2)"));
        assert_eq!(log[3], "COMMIT");
    }

    #[tokio::test]
    async fn test_empty_window_skips_projection() {
        let (ops, log) = fake_ops(0, vec![], vec![]);

        let page = ops
            .find_page(
                movies(),
                &RawFilter::new(),
                &LanguageSelector::Any,
                &PageRequest::new(0, 20),
            )
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_filter_fails_before_storage() {
        let (ops, log) = fake_ops(0, vec![], vec![]);
        let mut filter = RawFilter::new();
        filter.insert("foo".to_string(), "bar".to_string());

        let err = ops
            .find_page(movies(), &filter, &LanguageSelector::Any, &PageRequest::new(0, 20))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFilterField { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_entry_by_id() {
        let (ops, _) = fake_ops(0, vec![], vec![row(5, "en-US", "Five")]);
        let entry = ops
            .find_entry_by_id(movies(), 5, &LanguageSelector::Tag("en-US".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.id, 5);
        assert_eq!(entry.translations[0].fields["name"], json!("Five"));

        let (ops, _) = fake_ops(0, vec![], vec![]);
        assert!(ops
            .find_entry_by_id(movies(), 5, &LanguageSelector::Any)
            .await
            .unwrap()
            .is_none());
    }
}
