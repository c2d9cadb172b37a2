//! Reconciliation of declarative settings against a defcon store.
//!
//! - [`reconcile_components`] makes the persisted components and their plugin
//!   instances match `[components.*]` exactly.
//! - [`load_plugins`] registers the `[plugins.*]` catalog entries.
//!
//! Every action is pushed to a [`Progress`] sink as it happens, so a run that
//! fails halfway has already reported what it applied.

mod components;
mod error;
mod plugins;
mod progress;
mod report;

pub use components::reconcile_components;
pub use error::SyncError;
pub use plugins::load_plugins;
pub use progress::{ActionKind, Progress, SyncAction};
pub use report::{ChangeSet, SyncReport};
