use defcon_storage::StorageError;

/// Errors that abort a synchronization run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A component references a plugin id missing from the catalog.
    #[error("Plugin \"{plugin_id}\" does not exist (referenced by component \"{component_id}\")")]
    UnknownPlugin {
        plugin_id: String,
        component_id: String,
    },

    /// Any store-layer failure, passed through unmodified.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SyncError {
    pub fn unknown_plugin(plugin_id: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self::UnknownPlugin {
            plugin_id: plugin_id.into(),
            component_id: component_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_plugin_message() {
        let err = SyncError::unknown_plugin("nope", "website");
        assert_eq!(
            err.to_string(),
            "Plugin \"nope\" does not exist (referenced by component \"website\")"
        );
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: SyncError = StorageError::connection_error("refused").into();
        assert_eq!(err.to_string(), "Connection error: refused");
    }
}
