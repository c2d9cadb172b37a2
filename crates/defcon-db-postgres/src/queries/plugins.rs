//! Queries against the `plugin` catalog table.

use defcon_storage::{Plugin, StorageError, UpsertOutcome};
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;

use crate::error::query_error;

type PluginRow = (String, String, Option<String>);

fn from_row((id, name, description): PluginRow) -> Plugin {
    Plugin {
        id,
        name,
        description,
    }
}

pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Plugin>, StorageError> {
    let row: Option<PluginRow> = query_as("SELECT id, name, description FROM plugin WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| query_error("Failed to read plugin", e))?;
    Ok(row.map(from_row))
}

pub async fn list(pool: &PgPool) -> Result<Vec<Plugin>, StorageError> {
    let rows: Vec<PluginRow> = query_as("SELECT id, name, description FROM plugin ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(|e| query_error("Failed to list plugins", e))?;
    Ok(rows.into_iter().map(from_row).collect())
}

pub async fn upsert(pool: &PgPool, plugin: &Plugin) -> Result<UpsertOutcome, StorageError> {
    let inserted: Option<bool> = query_scalar(
        r#"
        INSERT INTO plugin (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, description = EXCLUDED.description
            WHERE plugin.name IS DISTINCT FROM EXCLUDED.name
               OR plugin.description IS DISTINCT FROM EXCLUDED.description
        RETURNING (xmax = 0)
        "#,
    )
    .bind(&plugin.id)
    .bind(&plugin.name)
    .bind(plugin.description.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(|e| query_error("Failed to write plugin", e))?;

    Ok(super::upsert_outcome(inserted))
}
