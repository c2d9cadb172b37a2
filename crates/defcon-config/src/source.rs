//! File-based settings source

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{ConfigError, Result, Settings};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "defcon.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
}

impl SettingsFormat {
    /// Picks the format from the file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// A settings file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    /// Whether a missing file is an error rather than empty settings.
    required: bool,
}

impl FileSource {
    /// Source for an explicitly requested file; it must exist.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    /// Source for `defcon.toml` in the working directory; optional.
    pub fn default_location() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SETTINGS_FILE),
            required: false,
        }
    }

    /// Explicit path when given, the default location otherwise.
    pub fn resolve(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::default_location(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the settings file.
    pub fn load(&self) -> Result<Settings> {
        let path = &self.path;

        if !path.exists() {
            if self.required {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "settings file does not exist",
                    ),
                });
            }
            debug!("Settings file does not exist: {:?}", path);
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let settings = match SettingsFormat::from_path(path) {
            SettingsFormat::Toml => Settings::from_toml_str(&content),
            SettingsFormat::Json => Settings::from_json_str(&content),
        }
        .map_err(|e| match e {
            ConfigError::Parse(msg) => ConfigError::parse(format!("{}: {msg}", path.display())),
            other => other,
        })?;

        info!(
            path = %path.display(),
            components = settings.components.len(),
            plugins = settings.plugins.len(),
            "Loaded settings"
        );
        Ok(settings)
    }
}
