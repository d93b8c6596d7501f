//! PostgreSQL translation store.
//!
//! One table per content type (`post_translations`, ...) with a unique index
//! on `(<content id column>, language_code)`. Column lists are generated from
//! the schema registry, so identifiers never come from caller input.

use super::TranslationStore;
use crate::error::{StoreError, StoreResult};
use crate::model::{ContentItem, FieldPatch, Translation};
use crate::retry::{with_retry_if, RetryConfig};
use crate::schema::{ContentSchema, ContentType};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database, retrying while it comes up.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = with_retry_if(
            &RetryConfig::store_connect(),
            "Database connection",
            || {
                PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect(database_url)
            },
            |err: &sqlx::Error| !matches!(err, sqlx::Error::Configuration(_)),
        )
        .await
        .context("Failed to connect to database")?;

        info!("Connected to database");
        Ok(Self { pool })
    }

    /// Create the translation tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for content_type in ContentType::ALL {
            let schema = content_type.schema();
            sqlx::query(&create_table_sql(schema))
                .execute(&self.pool)
                .await?;
            debug!(table = schema.translation_table, "Ensured translation table");
        }
        Ok(())
    }
}

// ==================== SQL Generation ====================

fn create_table_sql(schema: &ContentSchema) -> String {
    let mut columns = vec![
        "id TEXT PRIMARY KEY".to_string(),
        format!("{} TEXT NOT NULL", schema.content_id_field),
        "language_code TEXT NOT NULL".to_string(),
    ];
    for field in schema.required_fields {
        columns.push(format!("{} TEXT NOT NULL DEFAULT ''", field));
    }
    for field in schema.optional_fields {
        columns.push(format!("{} TEXT", field));
    }
    columns.push("created_at TIMESTAMPTZ NOT NULL DEFAULT now()".to_string());
    columns.push("updated_at TIMESTAMPTZ NOT NULL DEFAULT now()".to_string());
    columns.push(format!(
        "UNIQUE ({}, language_code)",
        schema.content_id_field
    ));

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        schema.translation_table,
        columns.join(", ")
    )
}

/// Every column, in the order rows are read and written.
fn column_list(schema: &ContentSchema) -> String {
    let mut columns = vec!["id", schema.content_id_field, "language_code"];
    columns.extend(schema.translatable_fields());
    columns.extend(["created_at", "updated_at"]);
    columns.join(", ")
}

/// `INSERT ... RETURNING` binding every column in `column_list` order.
fn insert_sql(schema: &ContentSchema) -> String {
    let placeholders: Vec<String> = (1..=schema.translatable_fields().len() + 5)
        .map(|i| format!("${}", i))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        schema.translation_table,
        column_list(schema),
        placeholders.join(", "),
        column_list(schema)
    )
}

/// `UPDATE ... RETURNING` binding the patched fields in order, then the id.
fn update_sql(schema: &ContentSchema, fields: &[&str]) -> String {
    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{} = ${}", field, i + 1))
        .chain(std::iter::once("updated_at = now()".to_string()))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        schema.translation_table,
        assignments.join(", "),
        fields.len() + 1,
        column_list(schema)
    )
}

fn row_to_translation(content_type: ContentType, row: &PgRow) -> Result<Translation, sqlx::Error> {
    let schema = content_type.schema();
    let id: String = row.try_get("id")?;
    let content_id: String = row.try_get(schema.content_id_field)?;
    let language_code: String = row.try_get("language_code")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    let mut translation =
        Translation::blank(content_type, id, content_id, language_code, created_at);
    for field in schema.translatable_fields() {
        let value: Option<String> = row.try_get(field)?;
        translation.set_field(field, value);
    }
    translation.set_updated_at(updated_at);
    Ok(translation)
}

fn map_write_error(err: sqlx::Error, content_id: &str, language_code: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation {
                content_id: content_id.to_string(),
                language_code: language_code.to_string(),
            };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl TranslationStore for PgStore {
    async fn list(
        &self,
        content_type: ContentType,
        content_id: &str,
        language_code: Option<&str>,
    ) -> StoreResult<Vec<Translation>> {
        let schema = content_type.schema();
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            column_list(schema),
            schema.translation_table,
            schema.content_id_field
        );
        if language_code.is_some() {
            sql.push_str(" AND language_code = $2");
        }
        sql.push_str(" ORDER BY language_code ASC");

        let mut query = sqlx::query(&sql).bind(content_id);
        if let Some(code) = language_code {
            query = query.bind(code);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row_to_translation(content_type, row).map_err(StoreError::from))
            .collect()
    }

    async fn get(&self, content_type: ContentType, id: &str) -> StoreResult<Option<Translation>> {
        let schema = content_type.schema();
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            column_list(schema),
            schema.translation_table
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| row_to_translation(content_type, &row))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn insert(&self, translation: Translation) -> StoreResult<Translation> {
        let content_type = translation.content_type();
        let schema = content_type.schema();
        let fields = schema.translatable_fields();
        let sql = insert_sql(schema);

        let now = Utc::now();
        let mut query = sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(translation.content_id())
            .bind(translation.language_code());
        for field in &fields {
            let value = translation.field(field).map(str::to_string);
            query = if schema.is_required(field) {
                query.bind(value.unwrap_or_default())
            } else {
                query.bind(value)
            };
        }
        query = query.bind(now).bind(now);

        let row = query.fetch_one(&self.pool).await.map_err(|err| {
            map_write_error(err, translation.content_id(), translation.language_code())
        })?;
        Ok(row_to_translation(content_type, &row)?)
    }

    async fn update(
        &self,
        content_type: ContentType,
        id: &str,
        patch: &FieldPatch,
    ) -> StoreResult<Translation> {
        let schema = content_type.schema();
        if let Some(unknown) = patch.keys().find(|field| !schema.is_translatable(field)) {
            return Err(StoreError::Backend(format!(
                "column '{}' does not exist on {}",
                unknown, schema.translation_table
            )));
        }

        let fields: Vec<&str> = patch.keys().map(String::as_str).collect();
        let sql = update_sql(schema, &fields);

        let mut query = sqlx::query(&sql);
        for (field, value) in patch {
            query = if schema.is_required(field) {
                query.bind(value.clone().unwrap_or_default())
            } else {
                query.bind(value.clone())
            };
        }

        let row = query.bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(row_to_translation(content_type, &row)?),
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    async fn delete(&self, content_type: ContentType, id: &str) -> StoreResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1",
            content_type.schema().translation_table
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn list_with_parent(&self, content_type: ContentType) -> StoreResult<Vec<ContentItem>> {
        let schema = content_type.schema();
        let parents_sql = format!(
            "SELECT p.id::text AS id, p.created_at, to_jsonb(p) AS attributes \
             FROM {} p ORDER BY p.created_at DESC",
            schema.parent_table
        );
        let parent_rows = sqlx::query(&parents_sql).fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(parent_rows.len());
        for row in &parent_rows {
            let attributes: serde_json::Value = row.try_get("attributes")?;
            let attributes: BTreeMap<String, String> = attributes
                .as_object()
                .map(|object| {
                    object
                        .iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect()
                })
                .unwrap_or_default();

            items.push(ContentItem {
                id: row.try_get("id")?,
                content_type,
                created_at: row.try_get("created_at")?,
                attributes,
                translations: Vec::new(),
            });
        }

        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        let translations_sql = format!(
            "SELECT {} FROM {} WHERE {} = ANY($1) ORDER BY language_code ASC",
            column_list(schema),
            schema.translation_table,
            schema.content_id_field
        );
        let rows = sqlx::query(&translations_sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_item: HashMap<String, Vec<Translation>> = HashMap::new();
        for row in &rows {
            let translation = row_to_translation(content_type, row)?;
            by_item
                .entry(translation.content_id().to_string())
                .or_default()
                .push(translation);
        }
        for item in &mut items {
            item.translations = by_item.remove(&item.id).unwrap_or_default();
        }

        Ok(items)
    }

    async fn bulk_delete(
        &self,
        content_type: ContentType,
        content_ids: &[String],
        language_code: Option<&str>,
    ) -> StoreResult<u64> {
        let schema = content_type.schema();
        let mut sql = format!(
            "DELETE FROM {} WHERE {} = ANY($1)",
            schema.translation_table, schema.content_id_field
        );
        if language_code.is_some() {
            sql.push_str(" AND language_code = $2");
        }

        let mut query = sqlx::query(&sql).bind(content_ids.to_vec());
        if let Some(code) = language_code {
            query = query.bind(code);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
