//! Plugin catalog registration.

use std::collections::BTreeMap;

use defcon_config::PluginSettings;
use defcon_storage::{Plugin, StatusStore};
use tracing::{info, instrument};

use crate::error::SyncError;
use crate::progress::{Progress, SyncAction};
use crate::report::SyncReport;

/// Upserts every catalog entry from settings, in id order.
///
/// Entries missing from settings are left in place: components managed
/// outside this tool may still reference them.
#[instrument(skip_all, fields(backend = store.backend_name(), plugins = plugins.len()))]
pub async fn load_plugins(
    store: &dyn StatusStore,
    plugins: &BTreeMap<String, PluginSettings>,
    progress: &mut dyn Progress,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();

    for (id, settings) in plugins {
        let plugin = to_plugin(id, settings);
        let outcome = store.upsert_plugin(&plugin).await?;

        let action = SyncAction::Plugin {
            outcome,
            id: id.clone(),
        };
        report.record(&action);
        progress.report(&action);
    }

    info!(
        created = report.plugins.created.len(),
        updated = report.plugins.updated.len(),
        "Plugin catalog loaded"
    );
    Ok(report)
}

fn to_plugin(id: &str, settings: &PluginSettings) -> Plugin {
    Plugin {
        id: id.to_string(),
        name: settings.name.clone().unwrap_or_else(|| id.to_string()),
        description: settings.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defcon_db_memory::InMemoryStore;
    use defcon_storage::UpsertOutcome;

    #[test]
    fn test_name_defaults_to_id() {
        let plugin = to_plugin("static", &PluginSettings::default());
        assert_eq!(plugin.name, "static");
        assert!(plugin.description.is_none());
    }

    #[tokio::test]
    async fn test_load_plugins_never_removes() {
        let store = InMemoryStore::new().with_plugin(Plugin::new("legacy", "Legacy"));
        let plugins = BTreeMap::from([(
            "static".to_string(),
            PluginSettings {
                name: Some("Static".into()),
                description: None,
            },
        )]);

        let mut actions: Vec<SyncAction> = Vec::new();
        let report = load_plugins(&store, &plugins, &mut actions).await.unwrap();

        assert_eq!(report.plugins.created, vec!["static"]);
        assert_eq!(
            actions,
            vec![SyncAction::Plugin {
                outcome: UpsertOutcome::Created,
                id: "static".into(),
            }]
        );
        assert!(store.get_plugin("legacy").await.unwrap().is_some());

        let mut actions: Vec<SyncAction> = Vec::new();
        let report = load_plugins(&store, &plugins, &mut actions).await.unwrap();
        assert!(!report.has_changes());
        assert_eq!(actions[0].to_string(), "Unchanged plugin static");
    }
}
