//! Queries against the `component` table.

use std::collections::BTreeSet;

use defcon_storage::{Component, StorageError, UpsertOutcome};
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;

use crate::error::query_error;

type ComponentRow = (String, String, Value);

fn from_row((id, name, attributes): ComponentRow) -> Result<Component, StorageError> {
    match attributes {
        Value::Object(attributes) => Ok(Component {
            id,
            name,
            attributes,
        }),
        other => Err(StorageError::internal(format!(
            "component \"{id}\" has non-object attributes: {other}"
        ))),
    }
}

pub async fn list_ids(pool: &PgPool) -> Result<BTreeSet<String>, StorageError> {
    let ids: Vec<String> = query_scalar("SELECT id FROM component ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(|e| query_error("Failed to list components", e))?;
    Ok(ids.into_iter().collect())
}

pub async fn list(pool: &PgPool) -> Result<Vec<Component>, StorageError> {
    let rows: Vec<ComponentRow> =
        query_as("SELECT id, name, attributes FROM component ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(|e| query_error("Failed to list components", e))?;
    rows.into_iter().map(from_row).collect()
}

pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Component>, StorageError> {
    let row: Option<ComponentRow> =
        query_as("SELECT id, name, attributes FROM component WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| query_error("Failed to read component", e))?;
    row.map(from_row).transpose()
}

pub async fn upsert(pool: &PgPool, component: &Component) -> Result<UpsertOutcome, StorageError> {
    let inserted: Option<bool> = query_scalar(
        r#"
        INSERT INTO component (id, name, attributes)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, attributes = EXCLUDED.attributes
            WHERE component.name IS DISTINCT FROM EXCLUDED.name
               OR component.attributes IS DISTINCT FROM EXCLUDED.attributes
        RETURNING (xmax = 0)
        "#,
    )
    .bind(&component.id)
    .bind(&component.name)
    .bind(Value::Object(component.attributes.clone()))
    .fetch_optional(pool)
    .await
    .map_err(|e| query_error("Failed to write component", e))?;

    Ok(super::upsert_outcome(inserted))
}

/// Deletes a component; its plugin instances go with it through the
/// `ON DELETE CASCADE` foreign key.
pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, StorageError> {
    let result = query("DELETE FROM component WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| query_error("Failed to delete component", e))?;
    Ok(result.rows_affected() > 0)
}
