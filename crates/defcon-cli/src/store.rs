use anyhow::{Context, Result};
use defcon_config::{PostgresSettings, StorageBackend, StorageSettings};
use defcon_db_postgres::{PostgresConfig, PostgresStore};
use defcon_storage::DynStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Backend chosen for this invocation after flags are layered over settings.
#[derive(Debug, Clone)]
pub enum StoreChoice {
    Memory,
    Postgres(PostgresConfig),
}

/// `--database-url` selects postgres; otherwise `--backend`, then settings.
pub fn choose(
    storage: &StorageSettings,
    backend: Option<StorageBackend>,
    database_url: Option<&str>,
) -> StoreChoice {
    if let Some(url) = database_url {
        if backend == Some(StorageBackend::Memory) {
            warn!("--database-url given, ignoring --backend memory");
        }
        let mut config = postgres_config(&storage.postgres);
        config.url = url.to_string();
        return StoreChoice::Postgres(config);
    }

    match backend.unwrap_or(storage.backend) {
        StorageBackend::Memory => StoreChoice::Memory,
        StorageBackend::Postgres => StoreChoice::Postgres(postgres_config(&storage.postgres)),
    }
}

fn postgres_config(settings: &PostgresSettings) -> PostgresConfig {
    PostgresConfig::new(&settings.url)
        .with_pool_size(settings.pool_size)
        .with_connect_timeout_ms(settings.connect_timeout_ms)
        .with_idle_timeout_ms(settings.idle_timeout_ms)
        .with_run_migrations(settings.run_migrations)
}

pub async fn open(choice: StoreChoice) -> Result<DynStore> {
    match choice {
        StoreChoice::Memory => {
            info!("Using in-memory store; nothing persists after exit");
            Ok(defcon_db_memory::create_store())
        }
        StoreChoice::Postgres(config) => {
            let store = PostgresStore::new(config)
                .await
                .context("Failed to open PostgreSQL store")?;
            Ok(Arc::new(store))
        }
    }
}
