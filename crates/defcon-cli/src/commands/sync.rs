use anyhow::Result;
use defcon_config::Settings;
use defcon_storage::StatusStore;
use defcon_sync::SyncReport;

use crate::output::{ConsoleProgress, print_summary};

pub async fn load_components(store: &dyn StatusStore, settings: &Settings) -> Result<SyncReport> {
    let report =
        defcon_sync::reconcile_components(store, &settings.components, &mut ConsoleProgress)
            .await?;
    print_summary(&report);
    Ok(report)
}

pub async fn load_plugins(store: &dyn StatusStore, settings: &Settings) -> Result<SyncReport> {
    let report = defcon_sync::load_plugins(store, &settings.plugins, &mut ConsoleProgress).await?;
    print_summary(&report);
    Ok(report)
}

/// Catalog first, so components can reference plugins declared in the same file.
pub async fn sync(store: &dyn StatusStore, settings: &Settings) -> Result<SyncReport> {
    let mut progress = ConsoleProgress;
    let mut report = defcon_sync::load_plugins(store, &settings.plugins, &mut progress).await?;
    report.merge(
        defcon_sync::reconcile_components(store, &settings.components, &mut progress).await?,
    );
    print_summary(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use defcon_db_memory::InMemoryStore;

    const SETTINGS: &str = r#"
[plugins.static]
name = "Static"

[components.api]
name = "API"

[components.api.plugins.static]
statuses = []
"#;

    #[tokio::test]
    async fn test_sync_registers_catalog_before_components() {
        let settings = Settings::from_toml_str(SETTINGS).unwrap();
        let store = InMemoryStore::new();

        let report = sync(&store, &settings).await.unwrap();
        assert_eq!(report.plugins.created, vec!["static"]);
        assert_eq!(report.components.created, vec!["api"]);
        assert_eq!(report.plugin_instances.created, vec!["api:static"]);

        let again = sync(&store, &settings).await.unwrap();
        assert!(!again.has_changes());
    }

    #[tokio::test]
    async fn test_load_components_without_catalog_fails() {
        let settings = Settings::from_toml_str(SETTINGS).unwrap();
        let store = InMemoryStore::new();

        let err = load_components(&store, &settings).await.unwrap_err();
        assert!(err.to_string().contains("Plugin \"static\" does not exist"));
    }
}
