use std::sync::OnceLock;

use defcon_storage::StorageError;
use defcon_sync::SyncError;
use tracing::error;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Switches to the level from the settings file once it is loaded.
/// A no-op when `RUST_LOG` is set.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|filter| *filter = EnvFilter::new(level));
    }
}

/// The store failure behind `err`, if any.
pub fn storage_cause(err: &anyhow::Error) -> Option<&StorageError> {
    err.chain().find_map(|cause| {
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return Some(storage);
        }
        match cause.downcast_ref::<SyncError>() {
            Some(SyncError::Storage(storage)) => Some(storage),
            _ => None,
        }
    })
}

pub fn log_failure(err: &anyhow::Error) {
    match storage_cause(err) {
        Some(storage) => error!(category = %storage.category(), "Storage operation failed"),
        None => error!("Command failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use defcon_storage::ErrorCategory;

    #[test]
    fn test_storage_cause_through_sync_error() {
        let err = anyhow::Error::from(SyncError::from(StorageError::connection_error("refused")));
        let cause = storage_cause(&err).unwrap();
        assert_eq!(cause.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn test_storage_cause_under_context() {
        let result: Result<(), StorageError> = Err(StorageError::conflict("fk"));
        let err = result.context("Failed to open PostgreSQL store").unwrap_err();
        assert_eq!(
            storage_cause(&err).map(StorageError::category),
            Some(ErrorCategory::Conflict)
        );
    }

    #[test]
    fn test_apply_level_before_init_is_noop() {
        apply_logging_level("debug");
        assert!(LOG_RELOAD_HANDLE.get().is_none());
    }

    #[test]
    fn test_no_storage_cause() {
        let err = anyhow::Error::from(SyncError::unknown_plugin("nope", "api"));
        assert!(storage_cause(&err).is_none());
        assert!(storage_cause(&anyhow::anyhow!("bad flag")).is_none());
    }
}
