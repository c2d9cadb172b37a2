//! In-memory storage backend for defcon.
//!
//! This crate provides an in-memory implementation of the `StatusStore` trait
//! from `defcon-storage`, using papaya lock-free HashMaps. Nothing survives
//! the process, so it serves tests and configuration validation runs.
//!
//! # Example
//!
//! ```ignore
//! use defcon_db_memory::InMemoryStore;
//! use defcon_storage::{Plugin, StatusStore};
//!
//! let store = InMemoryStore::new().with_plugin(Plugin::new("static", "Static"));
//! let (component, outcome) = store.upsert_component("website", &attrs).await?;
//! ```

pub mod storage;

pub use defcon_storage::{StatusStore, StorageError};
pub use storage::{InMemoryStore, InstanceKey};

/// Creates a new shareable in-memory store.
pub fn create_store() -> defcon_storage::DynStore {
    std::sync::Arc::new(InMemoryStore::new())
}
