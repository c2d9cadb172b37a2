//! Record types shared by every storage backend.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;

/// Descriptive component attributes, in configuration order.
pub type Attributes = Map<String, Value>;

/// Attribute key holding the nested plugin mapping in configuration.
/// It is never persisted as a component attribute.
pub const RESERVED_PLUGINS_KEY: &str = "plugins";

/// A monitored service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable identifier, unique across the store.
    pub id: String,
    /// Display name. Defaults to the id when attributes carry no `name`.
    pub name: String,
    /// Attributes as supplied by configuration (including `name` if given).
    pub attributes: Attributes,
}

impl Component {
    /// Builds a component record from configuration attributes, applying
    /// store validation.
    pub fn new(id: impl Into<String>, attributes: Attributes) -> Result<Self, StorageError> {
        let id = id.into();
        let name = validate_component(&id, &attributes)?;
        Ok(Self {
            id,
            name,
            attributes,
        })
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A pre-registered check/handler type from the plugin catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Plugin {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Binding of one component to one catalog plugin. Unique per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInstance {
    pub component_id: String,
    pub plugin_id: String,
    pub config: Value,
}

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpsertOutcome {
    /// No record existed for the key; one was inserted.
    Created,
    /// A record existed with different content and was overwritten.
    Updated,
    /// A record existed with identical content; nothing was written.
    Unchanged,
}

impl UpsertOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Unchanged => "Unchanged",
        }
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates a component record and returns its effective display name.
///
/// # Errors
///
/// Returns `StorageError::InvalidRecord` when the id is empty, when `name` is
/// present but not a non-empty string, or when attributes still carry the
/// reserved `plugins` key.
pub fn validate_component(id: &str, attributes: &Attributes) -> Result<String, StorageError> {
    if id.trim().is_empty() {
        return Err(StorageError::invalid_record("component id must not be empty"));
    }
    if attributes.contains_key(RESERVED_PLUGINS_KEY) {
        return Err(StorageError::invalid_record(format!(
            "component \"{id}\": attribute \"{RESERVED_PLUGINS_KEY}\" is reserved"
        )));
    }
    match attributes.get("name") {
        None => Ok(id.to_string()),
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(name.clone()),
        Some(other) => Err(StorageError::invalid_record(format!(
            "component \"{id}\": name must be a non-empty string, got {other}"
        ))),
    }
}

/// Compares two JSON values the way PostgreSQL compares `jsonb`.
///
/// Object key order is ignored and numbers compare by value (`1 == 1.0`).
pub fn json_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equivalent(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => attributes_equivalent(xs, ys),
        _ => a == b,
    }
}

/// [`json_equivalent`] for two attribute maps.
pub fn attributes_equivalent(a: &Attributes, b: &Attributes) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, x)| b.get(key).is_some_and(|y| json_equivalent(x, y)))
}

/// Validates a catalog entry.
///
/// # Errors
///
/// Returns `StorageError::InvalidRecord` for an empty id or name.
pub fn validate_plugin(plugin: &Plugin) -> Result<(), StorageError> {
    if plugin.id.trim().is_empty() {
        return Err(StorageError::invalid_record("plugin id must not be empty"));
    }
    if plugin.name.trim().is_empty() {
        return Err(StorageError::invalid_record(format!(
            "plugin \"{}\": name must not be empty",
            plugin.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_component_name_defaults_to_id() {
        let component = Component::new("website", Attributes::new()).unwrap();
        assert_eq!(component.name, "website");
        assert_eq!(component.to_string(), "website");
    }

    #[test]
    fn test_component_name_from_attributes() {
        let component = Component::new(
            "website",
            attrs(json!({"name": "Website", "link": "https://example.com"})),
        )
        .unwrap();
        assert_eq!(component.name, "Website");
        assert_eq!(component.attributes["link"], "https://example.com");
    }

    #[test]
    fn test_component_rejects_bad_name() {
        let err = Component::new("website", attrs(json!({"name": 42}))).unwrap_err();
        assert!(err.is_invalid_record());

        let err = Component::new("website", attrs(json!({"name": "  "}))).unwrap_err();
        assert!(err.is_invalid_record());
    }

    #[test]
    fn test_component_rejects_reserved_key_and_empty_id() {
        let err = Component::new("website", attrs(json!({"plugins": {}}))).unwrap_err();
        assert!(err.to_string().contains("reserved"));

        assert!(Component::new("", Attributes::new()).is_err());
    }

    #[test]
    fn test_validate_plugin() {
        assert!(validate_plugin(&Plugin::new("static", "Static")).is_ok());
        assert!(validate_plugin(&Plugin::new("", "Static")).is_err());
        assert!(validate_plugin(&Plugin::new("static", "")).is_err());
    }

    #[test]
    fn test_upsert_outcome_display() {
        assert_eq!(UpsertOutcome::Created.to_string(), "Created");
        assert_eq!(UpsertOutcome::Updated.to_string(), "Updated");
        assert_eq!(UpsertOutcome::Unchanged.to_string(), "Unchanged");
    }

    #[test]
    fn test_json_equivalent_numbers_by_value() {
        assert!(json_equivalent(&json!({"a": 1}), &json!({"a": 1.0})));
        assert!(json_equivalent(&json!([1, 2.5]), &json!([1.0, 2.5])));
        assert!(!json_equivalent(&json!({"a": 1}), &json!({"a": 1.5})));
        assert!(!json_equivalent(&json!(1), &json!("1")));
        assert!(!json_equivalent(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn test_json_equivalent_ignores_key_order() {
        assert!(json_equivalent(
            &json!({"a": 1, "b": {"c": [true, null]}}),
            &json!({"b": {"c": [true, null]}, "a": 1})
        ));
        assert!(!json_equivalent(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equivalent(&json!([1, 2]), &json!([2, 1])));
    }
}
