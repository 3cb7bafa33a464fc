use crate::error::{AppError, AppResult};
use crate::parser::ResourceType;
use crate::schema::{fields_for, FilterField, SemanticType};
use sqlx::SqlitePool;

/// Column type used for a semantic type. Dates are ISO-8601 text and
/// string arrays are JSON arrays, so both sort and compare as text.
pub fn column_type(semantic_type: SemanticType) -> &'static str {
    match semantic_type {
        SemanticType::String | SemanticType::Date | SemanticType::StringArray => "TEXT",
        SemanticType::Integer | SemanticType::Byte => "INTEGER",
    }
}

fn column_definition(field: &FilterField) -> String {
    let mut definition = format!("{} {}", field.column, column_type(field.semantic_type));
    if field.semantic_type == SemanticType::Byte {
        definition.push_str(&format!(
            " CHECK ({col} IS NULL OR {col} BETWEEN -128 AND 127)",
            col = field.column
        ));
    }
    definition
}

/// Create the root and translation tables for every resource kind
pub async fn init_catalog_schema(pool: &SqlitePool) -> AppResult<()> {
    for resource_type in ResourceType::ALL {
        init_resource_schema(pool, resource_type).await?;
    }
    Ok(())
}

async fn init_resource_schema(pool: &SqlitePool, resource_type: ResourceType) -> AppResult<()> {
    let schema = fields_for(resource_type);
    let root_table = resource_type.root_table();
    let translation_table = resource_type.translation_table();
    let foreign_key = resource_type.translation_foreign_key();

    let root_columns = schema
        .root_fields()
        .map(column_definition)
        .collect::<Vec<_>>()
        .join(",\n            ");
    let root_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {},
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        root_table, root_columns
    );

    sqlx::query(&root_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create {} table: {}", root_table, e)))?;

    let translation_columns = schema
        .translation_fields()
        .map(|field| {
            let mut definition = column_definition(field);
            if field.name == crate::schema::validation::REQUIRED_TRANSLATION_FIELD {
                definition.push_str(" NOT NULL");
            }
            definition
        })
        .collect::<Vec<_>>()
        .join(",\n            ");
    let translation_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {translations} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {fk} INTEGER NOT NULL,
            language TEXT NOT NULL,
            {columns},
            UNIQUE({fk}, language),
            FOREIGN KEY ({fk}) REFERENCES {root} (id) ON DELETE CASCADE
        )
        "#,
        translations = translation_table,
        fk = foreign_key,
        columns = translation_columns,
        root = root_table,
    );

    sqlx::query(&translation_sql)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create {} table: {}", translation_table, e))
        })?;

    create_indexes(pool, resource_type).await
}

/// Create lookup indexes for the join and language columns
async fn create_indexes(pool: &SqlitePool, resource_type: ResourceType) -> AppResult<()> {
    let translation_table = resource_type.translation_table();
    let indexes = [
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_{fk} ON {t} ({fk})",
            t = translation_table,
            fk = resource_type.translation_foreign_key()
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_language ON {t} (language)",
            t = translation_table
        ),
    ];

    for sql in &indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
