//! Actions reported while a run progresses.

use std::fmt;

use defcon_storage::UpsertOutcome;

/// Coarse classification of an action, used for colouring and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Created,
    Updated,
    Unchanged,
    Removed,
}

impl From<UpsertOutcome> for ActionKind {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created => Self::Created,
            UpsertOutcome::Updated => Self::Updated,
            UpsertOutcome::Unchanged => Self::Unchanged,
        }
    }
}

/// One store mutation (or confirmed no-op), in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Component {
        outcome: UpsertOutcome,
        id: String,
        name: String,
    },
    ComponentRemoved {
        id: String,
    },
    PluginInstance {
        outcome: UpsertOutcome,
        component_id: String,
        component_name: String,
        plugin_id: String,
        plugin_name: String,
    },
    PluginInstanceRemoved {
        component_id: String,
        component_name: String,
        plugin_id: String,
    },
    Plugin {
        outcome: UpsertOutcome,
        id: String,
    },
}

impl SyncAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Component { outcome, .. }
            | Self::PluginInstance { outcome, .. }
            | Self::Plugin { outcome, .. } => (*outcome).into(),
            Self::ComponentRemoved { .. } | Self::PluginInstanceRemoved { .. } => {
                ActionKind::Removed
            }
        }
    }

    /// Whether the action changed the store.
    pub fn is_change(&self) -> bool {
        self.kind() != ActionKind::Unchanged
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component { outcome, name, .. } => write!(f, "{outcome} {name}"),
            Self::ComponentRemoved { id } => write!(f, "Removed {id}"),
            Self::PluginInstance {
                outcome,
                component_name,
                plugin_name,
                ..
            } => write!(f, "{outcome} {component_name}:{plugin_name} config"),
            Self::PluginInstanceRemoved {
                component_name,
                plugin_id,
                ..
            } => write!(f, "Removed {component_name}:{plugin_id}"),
            Self::Plugin { outcome, id } => write!(f, "{outcome} plugin {id}"),
        }
    }
}

/// Receives actions as they happen.
pub trait Progress {
    fn report(&mut self, action: &SyncAction);
}

impl Progress for Vec<SyncAction> {
    fn report(&mut self, action: &SyncAction) {
        self.push(action.clone());
    }
}
