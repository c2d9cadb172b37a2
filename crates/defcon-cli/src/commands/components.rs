use anyhow::Result;
use defcon_storage::StatusStore;

use crate::cli::OutputFormat;
use crate::output::print_components;

pub async fn list(store: &dyn StatusStore, format: OutputFormat) -> Result<()> {
    let mut rows = Vec::new();
    for component in store.list_components().await? {
        let plugins = store
            .list_plugin_ids(&component.id)
            .await?
            .into_iter()
            .collect();
        rows.push((component, plugins));
    }
    print_components(&rows, format)
}
