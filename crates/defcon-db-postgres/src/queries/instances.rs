//! Queries against the `plugin_instance` table.

use std::collections::BTreeSet;

use defcon_storage::{PluginInstance, StorageError, UpsertOutcome};
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgPool;

use crate::error::query_error;

pub async fn list_plugin_ids(
    pool: &PgPool,
    component_id: &str,
) -> Result<BTreeSet<String>, StorageError> {
    let ids: Vec<String> = query_scalar(
        "SELECT plugin_id FROM plugin_instance WHERE component_id = $1 ORDER BY plugin_id",
    )
    .bind(component_id)
    .fetch_all(pool)
    .await
    .map_err(|e| query_error("Failed to list plugin instances", e))?;
    Ok(ids.into_iter().collect())
}

pub async fn get(
    pool: &PgPool,
    component_id: &str,
    plugin_id: &str,
) -> Result<Option<PluginInstance>, StorageError> {
    let config: Option<Value> = query_scalar(
        "SELECT config FROM plugin_instance WHERE component_id = $1 AND plugin_id = $2",
    )
    .bind(component_id)
    .bind(plugin_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| query_error("Failed to read plugin instance", e))?;

    Ok(config.map(|config| PluginInstance {
        component_id: component_id.to_string(),
        plugin_id: plugin_id.to_string(),
        config,
    }))
}

/// Missing component or plugin rows surface as a foreign key violation,
/// which maps to [`StorageError::Conflict`].
pub async fn upsert(
    pool: &PgPool,
    instance: &PluginInstance,
) -> Result<UpsertOutcome, StorageError> {
    let inserted: Option<bool> = query_scalar(
        r#"
        INSERT INTO plugin_instance (component_id, plugin_id, config)
        VALUES ($1, $2, $3)
        ON CONFLICT (component_id, plugin_id) DO UPDATE
            SET config = EXCLUDED.config
            WHERE plugin_instance.config IS DISTINCT FROM EXCLUDED.config
        RETURNING (xmax = 0)
        "#,
    )
    .bind(&instance.component_id)
    .bind(&instance.plugin_id)
    .bind(&instance.config)
    .fetch_optional(pool)
    .await
    .map_err(|e| query_error("Failed to write plugin instance", e))?;

    Ok(super::upsert_outcome(inserted))
}

pub async fn delete(
    pool: &PgPool,
    component_id: &str,
    plugin_id: &str,
) -> Result<bool, StorageError> {
    let result = query("DELETE FROM plugin_instance WHERE component_id = $1 AND plugin_id = $2")
        .bind(component_id)
        .bind(plugin_id)
        .execute(pool)
        .await
        .map_err(|e| query_error("Failed to delete plugin instance", e))?;
    Ok(result.rows_affected() > 0)
}
