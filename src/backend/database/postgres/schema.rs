use crate::error::{AppError, AppResult};
use crate::parser::ResourceType;
use crate::schema::validation::REQUIRED_TRANSLATION_FIELD;
use crate::schema::{fields_for, FilterField, SemanticType};
use sqlx::PgPool;

pub fn column_type(semantic_type: SemanticType) -> &'static str {
    match semantic_type {
        SemanticType::String => "TEXT",
        SemanticType::Integer => "BIGINT",
        SemanticType::Byte => "SMALLINT",
        SemanticType::Date => "DATE",
        SemanticType::StringArray => "TEXT[]",
    }
}

fn column_definition(field: &FilterField) -> String {
    let mut definition = format!("{} {}", field.column, column_type(field.semantic_type));
    if field.semantic_type == SemanticType::Byte {
        definition.push_str(&format!(" CHECK ({} BETWEEN -128 AND 127)", field.column));
    }
    if field.name == REQUIRED_TRANSLATION_FIELD {
        definition.push_str(" NOT NULL");
    }
    definition
}

/// Create the root and translation tables for every resource kind
pub async fn init_catalog_schema(pool: &PgPool) -> AppResult<()> {
    for resource_type in ResourceType::ALL {
        init_resource_schema(pool, resource_type).await?;
    }
    Ok(())
}

async fn init_resource_schema(pool: &PgPool, resource_type: ResourceType) -> AppResult<()> {
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
            id BIGSERIAL PRIMARY KEY,
            {},
            created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
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
        .map(column_definition)
        .collect::<Vec<_>>()
        .join(",\n            ");
    let translation_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {translations} (
            id BIGSERIAL PRIMARY KEY,
            {fk} BIGINT NOT NULL REFERENCES {root} (id) ON DELETE CASCADE,
            language TEXT NOT NULL,
            {columns},
            UNIQUE({fk}, language)
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

    let mut indexes = vec![
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_{fk} ON {t} ({fk})",
            t = translation_table,
            fk = foreign_key
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_language ON {t} (language)",
            t = translation_table
        ),
    ];
    indexes.extend(
        schema
            .root_fields()
            .filter(|field| field.semantic_type.is_array())
            .map(|field| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{r}_{c} ON {r} USING GIN ({c})",
                    r = root_table,
                    c = field.column
                )
            }),
    );

    for sql in &indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
