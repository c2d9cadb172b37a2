//! # defcon-storage
//!
//! Storage abstraction layer for defcon.
//!
//! This crate defines the records and the repository trait that every storage
//! backend implements. It does not contain any implementations; those live in
//! `defcon-db-memory` and `defcon-db-postgres`.
//!
//! ## Overview
//!
//! The main trait is [`StatusStore`], which covers:
//! - components (list ids, get, upsert, delete with cascading instances)
//! - plugin instances per component (list, get, upsert, delete)
//! - the plugin catalog (get, list, upsert)
//!
//! ## Example
//!
//! ```ignore
//! use defcon_storage::{StatusStore, StorageError};
//!
//! async fn attached(store: &dyn StatusStore, cid: &str) -> Result<Vec<String>, StorageError> {
//!     let ids = store.list_plugin_ids(cid).await?;
//!     Ok(ids.into_iter().collect())
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::StatusStore;
pub use types::{
    Attributes, Component, Plugin, PluginInstance, RESERVED_PLUGINS_KEY, UpsertOutcome,
    attributes_equivalent, json_equivalent, validate_component, validate_plugin,
};

/// Type alias for a shareable store trait object.
pub type DynStore = std::sync::Arc<dyn StatusStore>;
