//! Typed settings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ConfigError, Result};

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
    /// Plugin catalog entries, keyed by plugin id.
    pub plugins: BTreeMap<String, PluginSettings>,
    /// Desired components, keyed by component id.
    pub components: BTreeMap<String, ComponentSpec>,
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// The document is converted to JSON first so component attributes and
    /// plugin configs hold plain JSON values. Datetimes become their RFC 3339
    /// text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))?;
        let value = toml_to_json(toml::Value::Table(table))?;
        let settings: Self =
            serde_json::from_value(value).map_err(|e| ConfigError::parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Structural checks that serde cannot express.
    ///
    /// Attribute contents are not inspected here; the store validates them.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::validation("logging.level must not be empty"));
        }
        if self.storage.postgres.pool_size == 0 {
            return Err(ConfigError::validation(
                "storage.postgres.pool_size must be greater than zero",
            ));
        }
        if let Some(id) = self.plugins.keys().find(|id| id.trim().is_empty()) {
            return Err(ConfigError::validation(format!("invalid plugin id {id:?}")));
        }
        for (cid, spec) in &self.components {
            if cid.trim().is_empty() {
                return Err(ConfigError::validation(format!("invalid component id {cid:?}")));
            }
            if let Some(pid) = spec.plugins.keys().find(|id| id.trim().is_empty()) {
                return Err(ConfigError::validation(format!(
                    "component \"{cid}\": invalid plugin id {pid:?}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `defcon_sync=debug,info`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Which `StatusStore` implementation backs a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::validation(format!(
                "unknown storage backend \"{other}\" (expected postgres or memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub postgres: PostgresSettings,
}

fn toml_to_json(value: toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| ConfigError::parse(format!("unsupported non-finite number {f}")))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| Ok((key, toml_to_json(value)?)))
                .collect::<Result<Map<_, _>>>()?,
        ),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostgresSettings {
    pub url: String,
    pub pool_size: u32,
    pub connect_timeout_ms: u64,
    /// Idle connections are closed after this long; 0 keeps them open.
    pub idle_timeout_ms: u64,
    pub run_migrations: bool,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/defcon".to_string(),
            pool_size: 5,
            connect_timeout_ms: 5000,
            idle_timeout_ms: 60_000,
            run_migrations: true,
        }
    }
}

/// A plugin catalog entry as written in settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginSettings {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// One desired component: arbitrary attributes plus its plugin mapping.
///
/// The `plugins` key is split off during deserialization; everything else
/// lands in `attributes` in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(default)]
    pub plugins: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
[logging]
level = "debug"

[storage]
backend = "memory"

[plugins.static]
name = "Static"

[components.website]
name = "Website"
link = "https://example.com"

[components.website.plugins.static]
statuses = [{ title = "ok", level = 1 }]

[components.api]
"#;

    #[test]
    fn test_parse_toml() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();

        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.plugins["static"].name.as_deref(), Some("Static"));

        let website = &settings.components["website"];
        assert_eq!(website.attributes["name"], "Website");
        assert_eq!(website.attributes["link"], "https://example.com");
        assert!(!website.attributes.contains_key("plugins"));
        assert_eq!(
            website.plugins["static"],
            json!({"statuses": [{"title": "ok", "level": 1}]})
        );

        let api = &settings.components["api"];
        assert!(api.plugins.is_empty());
        assert!(api.attributes.is_empty());
    }

    #[test]
    fn test_toml_datetimes_become_strings() {
        let settings = Settings::from_toml_str(
            r#"
[components.x]
since = 2024-01-01
deployed = 1979-05-27T07:32:00Z

[components.x.plugins.static]
windows = [{ start = 07:30:00 }]
"#,
        )
        .unwrap();

        let x = &settings.components["x"];
        assert_eq!(x.attributes["since"], json!("2024-01-01"));
        assert_eq!(x.attributes["deployed"], json!("1979-05-27T07:32:00Z"));
        assert_eq!(
            x.plugins["static"],
            json!({"windows": [{"start": "07:30:00"}]})
        );
    }

    #[test]
    fn test_toml_attributes_keep_file_order() {
        let settings =
            Settings::from_toml_str("[components.x]\nzeta = 1\nalpha = 2.5\nmid = true\n").unwrap();
        let keys: Vec<&str> = settings.components["x"]
            .attributes
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(settings.components["x"].attributes["alpha"], json!(2.5));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let err = Settings::from_toml_str("[components.x]\nweight = nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_json() {
        let settings = Settings::from_json_str(
            r#"{"components": {"x": {"name": "X", "plugins": {"p1": {"a": 1}}}}}"#,
        )
        .unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert_eq!(settings.components["x"].plugins["p1"], json!({"a": 1}));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.storage.postgres.pool_size, 5);
        assert_eq!(settings.storage.postgres.idle_timeout_ms, 60_000);
        assert!(settings.storage.postgres.run_migrations);
        assert!(settings.components.is_empty());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Settings::from_toml_str("[server]\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_plugins_must_be_a_table() {
        let err = Settings::from_toml_str("[components.x]\nplugins = [1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation() {
        let err = Settings::from_toml_str("[storage.postgres]\npool_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Settings::from_json_str(r#"{"components": {"": {}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("PostgreSQL".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("sqlite".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
    }
}
