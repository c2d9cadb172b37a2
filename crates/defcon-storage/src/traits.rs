//! Repository trait for the defcon storage abstraction layer.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::types::{Attributes, Component, Plugin, PluginInstance, UpsertOutcome};

/// The repository every defcon storage backend implements.
///
/// Every call is an independent, immediately persisted operation; the trait
/// has no transaction boundary. Implementations must be thread-safe
/// (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use defcon_storage::{StatusStore, StorageError};
///
/// async fn display_name(store: &dyn StatusStore, id: &str) -> Result<String, StorageError> {
///     let component = store.get_component(id).await?;
///     Ok(component.map_or_else(|| id.to_string(), |c| c.name))
/// }
/// ```
#[async_trait]
pub trait StatusStore: Send + Sync {
    // ==================== Components ====================

    /// Returns the ids of every persisted component.
    async fn list_component_ids(&self) -> Result<BTreeSet<String>, StorageError>;

    /// Returns every persisted component, sorted by id.
    async fn list_components(&self) -> Result<Vec<Component>, StorageError>;

    /// Reads a component by id. Returns `None` if it does not exist.
    async fn get_component(&self, id: &str) -> Result<Option<Component>, StorageError>;

    /// Creates the component or overwrites its attributes.
    ///
    /// Attributes are compared with the same JSON equivalence as plugin
    /// instance configs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` when the attributes fail
    /// [`validate_component`](crate::validate_component).
    async fn upsert_component(
        &self,
        id: &str,
        attributes: &Attributes,
    ) -> Result<(Component, UpsertOutcome), StorageError>;

    /// Deletes a component together with all of its plugin instances.
    ///
    /// Deleting a missing component succeeds. Returns whether a record was
    /// removed.
    async fn delete_component(&self, id: &str) -> Result<bool, StorageError>;

    // ==================== Plugin instances ====================

    /// Returns the plugin ids attached to a component.
    async fn list_plugin_ids(&self, component_id: &str) -> Result<BTreeSet<String>, StorageError>;

    /// Reads the instance binding `component_id` to `plugin_id`.
    async fn get_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
    ) -> Result<Option<PluginInstance>, StorageError>;

    /// Creates the instance or overwrites its config.
    ///
    /// Configs are compared as JSON values: object key order is ignored and
    /// numbers compare by value, so `1` and `1.0` are the same config and the
    /// outcome is `Unchanged`. See [`json_equivalent`](crate::json_equivalent).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when the component or the catalog
    /// plugin does not exist.
    async fn upsert_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
        config: &Value,
    ) -> Result<(PluginInstance, UpsertOutcome), StorageError>;

    /// Deletes one instance. Deleting a missing instance succeeds.
    async fn delete_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
    ) -> Result<bool, StorageError>;

    // ==================== Plugin catalog ====================

    /// Looks up a catalog entry by id.
    async fn get_plugin(&self, id: &str) -> Result<Option<Plugin>, StorageError>;

    /// Returns the whole catalog, sorted by id.
    async fn list_plugins(&self) -> Result<Vec<Plugin>, StorageError>;

    /// Registers or refreshes a catalog entry.
    async fn upsert_plugin(&self, plugin: &Plugin) -> Result<UpsertOutcome, StorageError>;

    // ==================== Metadata ====================

    /// Returns the name of this storage backend for logging.
    fn backend_name(&self) -> &'static str;
}
