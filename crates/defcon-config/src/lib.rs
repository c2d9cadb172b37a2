//! Settings management for defcon.
//!
//! Settings are read once at process start from a single file and handed to
//! the rest of the program as an immutable [`Settings`] value:
//!
//! - `[logging]`: tracing filter directive
//! - `[storage]`: backend selection and PostgreSQL connection settings
//! - `[plugins.<id>]`: plugin catalog entries registered by `load-plugins`
//! - `[components.<id>]`: the declarative component set reconciled by
//!   `load-components`, each with an optional `plugins` table
//!
//! TOML is the default format; files ending in `.json` are parsed as JSON.

pub mod settings;
pub mod source;

pub use settings::{
    ComponentSpec, LoggingSettings, PluginSettings, PostgresSettings, Settings, StorageBackend,
    StorageSettings,
};
pub use source::{DEFAULT_SETTINGS_FILE, FileSource, SettingsFormat};

/// Error types for settings operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, ConfigError>;
