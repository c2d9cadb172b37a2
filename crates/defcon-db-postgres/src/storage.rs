//! PostgreSQL implementation of [`StatusStore`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use defcon_storage::{
    Attributes, Component, Plugin, PluginInstance, StatusStore, StorageError, UpsertOutcome,
    validate_plugin,
};
use serde_json::Value;
use sqlx_postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::pool::{create_pool, mask_password};
use crate::queries::{components, instances, plugins};

/// Status store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects using `config`, applying migrations when
    /// `config.run_migrations` is set.
    #[instrument(skip(config), fields(url = %mask_password(&config.url)))]
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = create_pool(&config).await?;

        if config.run_migrations {
            crate::migrations::run(&pool).await?;
        }

        info!("PostgreSQL store initialized");
        Ok(Self { pool })
    }

    /// Wraps an existing pool. Migrations are the caller's concern.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusStore for PostgresStore {
    async fn list_component_ids(&self) -> Result<BTreeSet<String>, StorageError> {
        components::list_ids(&self.pool).await
    }

    async fn list_components(&self) -> Result<Vec<Component>, StorageError> {
        components::list(&self.pool).await
    }

    async fn get_component(&self, id: &str) -> Result<Option<Component>, StorageError> {
        components::get(&self.pool, id).await
    }

    async fn upsert_component(
        &self,
        id: &str,
        attributes: &Attributes,
    ) -> Result<(Component, UpsertOutcome), StorageError> {
        let component = Component::new(id, attributes.clone())?;
        let outcome = components::upsert(&self.pool, &component).await?;
        debug!(id, outcome = %outcome, "Upserted component");
        Ok((component, outcome))
    }

    async fn delete_component(&self, id: &str) -> Result<bool, StorageError> {
        components::delete(&self.pool, id).await
    }

    async fn list_plugin_ids(&self, component_id: &str) -> Result<BTreeSet<String>, StorageError> {
        instances::list_plugin_ids(&self.pool, component_id).await
    }

    async fn get_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
    ) -> Result<Option<PluginInstance>, StorageError> {
        instances::get(&self.pool, component_id, plugin_id).await
    }

    async fn upsert_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
        config: &Value,
    ) -> Result<(PluginInstance, UpsertOutcome), StorageError> {
        let instance = PluginInstance {
            component_id: component_id.to_string(),
            plugin_id: plugin_id.to_string(),
            config: config.clone(),
        };
        let outcome = instances::upsert(&self.pool, &instance).await?;
        debug!(component_id, plugin_id, outcome = %outcome, "Upserted plugin instance");
        Ok((instance, outcome))
    }

    async fn delete_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
    ) -> Result<bool, StorageError> {
        instances::delete(&self.pool, component_id, plugin_id).await
    }

    async fn get_plugin(&self, id: &str) -> Result<Option<Plugin>, StorageError> {
        plugins::get(&self.pool, id).await
    }

    async fn list_plugins(&self) -> Result<Vec<Plugin>, StorageError> {
        plugins::list(&self.pool).await
    }

    async fn upsert_plugin(&self, plugin: &Plugin) -> Result<UpsertOutcome, StorageError> {
        validate_plugin(plugin)?;
        plugins::upsert(&self.pool, plugin).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
