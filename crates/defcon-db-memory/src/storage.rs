use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use defcon_storage::{
    Attributes, Component, Plugin, PluginInstance, StatusStore, StorageError, UpsertOutcome,
    attributes_equivalent, json_equivalent, validate_plugin,
};
use papaya::HashMap as PapayaHashMap;
use serde_json::Value;
use tracing::debug;

/// Key of a plugin instance: `(component_id, plugin_id)`.
pub type InstanceKey = (String, String);

/// In-memory defcon storage backend using papaya lock-free HashMaps.
///
/// Component deletion removes the component's plugin instances explicitly,
/// since there is no foreign key to cascade through.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) components: Arc<PapayaHashMap<String, Component>>,
    pub(crate) instances: Arc<PapayaHashMap<InstanceKey, PluginInstance>>,
    pub(crate) plugins: Arc<PapayaHashMap<String, Plugin>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the catalog with a plugin. Intended for tests and bootstrapping.
    #[must_use]
    pub fn with_plugin(self, plugin: Plugin) -> Self {
        self.plugins.pin().insert(plugin.id.clone(), plugin);
        self
    }

    /// Number of persisted components.
    pub fn component_count(&self) -> usize {
        self.components.pin().len()
    }

    /// Number of persisted plugin instances across all components.
    pub fn instance_count(&self) -> usize {
        self.instances.pin().len()
    }

    fn instance_keys_of(&self, component_id: &str) -> Vec<InstanceKey> {
        let guard = self.instances.pin();
        guard
            .iter()
            .filter(|((cid, _), _)| cid == component_id)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl StatusStore for InMemoryStore {
    async fn list_component_ids(&self) -> Result<BTreeSet<String>, StorageError> {
        let guard = self.components.pin();
        Ok(guard.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn list_components(&self) -> Result<Vec<Component>, StorageError> {
        let guard = self.components.pin();
        let mut components: Vec<Component> = guard.iter().map(|(_, c)| c.clone()).collect();
        components.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(components)
    }

    async fn get_component(&self, id: &str) -> Result<Option<Component>, StorageError> {
        Ok(self.components.pin().get(id).cloned())
    }

    async fn upsert_component(
        &self,
        id: &str,
        attributes: &Attributes,
    ) -> Result<(Component, UpsertOutcome), StorageError> {
        let component = Component::new(id, attributes.clone())?;
        let guard = self.components.pin();

        let outcome = match guard.get(id) {
            None => UpsertOutcome::Created,
            Some(existing)
                if existing.name == component.name
                    && attributes_equivalent(&existing.attributes, &component.attributes) =>
            {
                return Ok((component, UpsertOutcome::Unchanged));
            }
            Some(_) => UpsertOutcome::Updated,
        };

        guard.insert(id.to_string(), component.clone());
        debug!(component_id = %id, outcome = %outcome, "component written");
        Ok((component, outcome))
    }

    async fn delete_component(&self, id: &str) -> Result<bool, StorageError> {
        let keys = self.instance_keys_of(id);
        let instances = self.instances.pin();
        for key in &keys {
            instances.remove(key);
        }

        let removed = self.components.pin().remove(id).is_some();
        debug!(component_id = %id, removed, instances = keys.len(), "component deleted");
        Ok(removed)
    }

    async fn list_plugin_ids(&self, component_id: &str) -> Result<BTreeSet<String>, StorageError> {
        Ok(self
            .instance_keys_of(component_id)
            .into_iter()
            .map(|(_, plugin_id)| plugin_id)
            .collect())
    }

    async fn get_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
    ) -> Result<Option<PluginInstance>, StorageError> {
        let key = (component_id.to_string(), plugin_id.to_string());
        Ok(self.instances.pin().get(&key).cloned())
    }

    async fn upsert_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
        config: &Value,
    ) -> Result<(PluginInstance, UpsertOutcome), StorageError> {
        if !self.components.pin().contains_key(component_id) {
            return Err(StorageError::conflict(format!(
                "plugin instance references unknown component \"{component_id}\""
            )));
        }
        if !self.plugins.pin().contains_key(plugin_id) {
            return Err(StorageError::conflict(format!(
                "plugin instance references unknown plugin \"{plugin_id}\""
            )));
        }

        let instance = PluginInstance {
            component_id: component_id.to_string(),
            plugin_id: plugin_id.to_string(),
            config: config.clone(),
        };
        let key = (component_id.to_string(), plugin_id.to_string());
        let guard = self.instances.pin();

        let outcome = match guard.get(&key) {
            None => UpsertOutcome::Created,
            Some(existing) if json_equivalent(&existing.config, config) => {
                return Ok((instance, UpsertOutcome::Unchanged));
            }
            Some(_) => UpsertOutcome::Updated,
        };

        guard.insert(key, instance.clone());
        Ok((instance, outcome))
    }

    async fn delete_plugin_instance(
        &self,
        component_id: &str,
        plugin_id: &str,
    ) -> Result<bool, StorageError> {
        let key = (component_id.to_string(), plugin_id.to_string());
        Ok(self.instances.pin().remove(&key).is_some())
    }

    async fn get_plugin(&self, id: &str) -> Result<Option<Plugin>, StorageError> {
        Ok(self.plugins.pin().get(id).cloned())
    }

    async fn list_plugins(&self) -> Result<Vec<Plugin>, StorageError> {
        let guard = self.plugins.pin();
        let mut plugins: Vec<Plugin> = guard.iter().map(|(_, p)| p.clone()).collect();
        plugins.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(plugins)
    }

    async fn upsert_plugin(&self, plugin: &Plugin) -> Result<UpsertOutcome, StorageError> {
        validate_plugin(plugin)?;
        let guard = self.plugins.pin();
        let outcome = match guard.get(&plugin.id) {
            None => UpsertOutcome::Created,
            Some(existing) if existing == plugin => return Ok(UpsertOutcome::Unchanged),
            Some(_) => UpsertOutcome::Updated,
        };
        guard.insert(plugin.id.clone(), plugin.clone());
        Ok(outcome)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
