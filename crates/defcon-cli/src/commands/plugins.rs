use anyhow::Result;
use defcon_storage::StatusStore;

use crate::cli::OutputFormat;
use crate::output::print_plugins;

pub async fn list(store: &dyn StatusStore, format: OutputFormat) -> Result<()> {
    let plugins = store.list_plugins().await?;
    print_plugins(&plugins, format)
}
