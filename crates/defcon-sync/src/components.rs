//! Component and plugin instance reconciliation.

use std::collections::{BTreeMap, BTreeSet};

use defcon_config::ComponentSpec;
use defcon_storage::{Component, StatusStore};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::SyncError;
use crate::progress::{Progress, SyncAction};
use crate::report::SyncReport;

/// Makes the store hold exactly the `desired` components, each with exactly
/// its desired plugin instances.
///
/// Components are processed in id order, then components missing from
/// `desired` are removed (their plugin instances go with them). Every
/// mutation is persisted immediately; when a plugin id is missing from the
/// catalog the run stops with [`SyncError::UnknownPlugin`] and whatever was
/// applied before stays applied.
///
/// # Errors
///
/// Returns `SyncError::UnknownPlugin` for a plugin id absent from the catalog,
/// and `SyncError::Storage` for any store failure.
#[instrument(skip_all, fields(backend = store.backend_name(), desired = desired.len()))]
pub async fn reconcile_components(
    store: &dyn StatusStore,
    desired: &BTreeMap<String, ComponentSpec>,
    progress: &mut dyn Progress,
) -> Result<SyncReport, SyncError> {
    let mut run = Run {
        store,
        progress,
        report: SyncReport::default(),
    };

    let existing = store.list_component_ids().await?;
    debug!(existing = existing.len(), "Loaded existing components");

    let mut kept = BTreeSet::new();
    for (cid, spec) in desired {
        run.add_component(cid, spec).await?;
        kept.insert(cid.as_str());
    }

    for cid in existing.iter().filter(|cid| !kept.contains(cid.as_str())) {
        store.delete_component(cid).await?;
        run.emit(SyncAction::ComponentRemoved { id: cid.clone() });
    }

    let report = run.report;
    info!(
        created = report.components.created.len(),
        updated = report.components.updated.len(),
        removed = report.components.removed.len(),
        plugins_created = report.plugin_instances.created.len(),
        plugins_updated = report.plugin_instances.updated.len(),
        plugins_removed = report.plugin_instances.removed.len(),
        "Components reconciled"
    );
    Ok(report)
}

struct Run<'a> {
    store: &'a dyn StatusStore,
    progress: &'a mut dyn Progress,
    report: SyncReport,
}

impl Run<'_> {
    fn emit(&mut self, action: SyncAction) {
        self.report.record(&action);
        self.progress.report(&action);
    }

    async fn add_component(&mut self, cid: &str, spec: &ComponentSpec) -> Result<(), SyncError> {
        let (component, outcome) = self.store.upsert_component(cid, &spec.attributes).await?;
        self.emit(SyncAction::Component {
            outcome,
            id: component.id.clone(),
            name: component.name.clone(),
        });

        let existing = self.store.list_plugin_ids(cid).await?;
        for (plugin_id, config) in &spec.plugins {
            self.configure_plugin(&component, plugin_id, config).await?;
        }

        for plugin_id in existing.iter().filter(|id| !spec.plugins.contains_key(*id)) {
            self.store.delete_plugin_instance(cid, plugin_id).await?;
            self.emit(SyncAction::PluginInstanceRemoved {
                component_id: component.id.clone(),
                component_name: component.name.clone(),
                plugin_id: plugin_id.clone(),
            });
        }
        Ok(())
    }

    async fn configure_plugin(
        &mut self,
        component: &Component,
        plugin_id: &str,
        config: &Value,
    ) -> Result<(), SyncError> {
        let plugin = self
            .store
            .get_plugin(plugin_id)
            .await?
            .ok_or_else(|| SyncError::unknown_plugin(plugin_id, &component.id))?;

        let (_, outcome) = self
            .store
            .upsert_plugin_instance(&component.id, &plugin.id, config)
            .await?;
        self.emit(SyncAction::PluginInstance {
            outcome,
            component_id: component.id.clone(),
            component_name: component.name.clone(),
            plugin_id: plugin.id.clone(),
            plugin_name: plugin.name,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defcon_db_memory::InMemoryStore;
    use defcon_storage::Plugin;
    use serde_json::json;

    fn spec(value: Value) -> ComponentSpec {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_actions_are_reported_in_order() {
        let store = InMemoryStore::new()
            .with_plugin(Plugin::new("p1", "Plugin One"))
            .with_plugin(Plugin::new("p2", "Plugin Two"));
        let desired = BTreeMap::from([
            (
                "b".to_string(),
                spec(json!({"name": "B", "plugins": {"p2": {}, "p1": {}}})),
            ),
            ("a".to_string(), spec(json!({"name": "A"}))),
        ]);

        let mut actions: Vec<SyncAction> = Vec::new();
        reconcile_components(&store, &desired, &mut actions)
            .await
            .unwrap();

        let lines: Vec<String> = actions.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "Created A",
                "Created B",
                "Created B:Plugin One config",
                "Created B:Plugin Two config",
            ]
        );
    }

    #[tokio::test]
    async fn test_removals_are_sorted() {
        let store = InMemoryStore::new();
        for id in ["c", "a", "b"] {
            store
                .upsert_component(id, &Default::default())
                .await
                .unwrap();
        }

        let mut actions: Vec<SyncAction> = Vec::new();
        let report = reconcile_components(&store, &BTreeMap::new(), &mut actions)
            .await
            .unwrap();

        assert_eq!(report.components.removed, vec!["a", "b", "c"]);
        assert_eq!(store.component_count(), 0);
    }
}
