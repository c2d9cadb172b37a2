use crate::progress::{ActionKind, SyncAction};

/// Keys touched per kind of action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
}

impl ChangeSet {
    fn record(&mut self, kind: ActionKind, key: String) {
        match kind {
            ActionKind::Created => self.created.push(key),
            ActionKind::Updated => self.updated.push(key),
            ActionKind::Unchanged => self.unchanged.push(key),
            ActionKind::Removed => self.removed.push(key),
        }
    }

    pub fn has_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty())
    }
}

/// Result of a run. Plugin instance keys are `component_id:plugin_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub components: ChangeSet,
    pub plugin_instances: ChangeSet,
    pub plugins: ChangeSet,
}

impl SyncReport {
    pub(crate) fn record(&mut self, action: &SyncAction) {
        let kind = action.kind();
        match action {
            SyncAction::Component { id, .. } | SyncAction::ComponentRemoved { id } => {
                self.components.record(kind, id.clone())
            }
            SyncAction::PluginInstance {
                component_id,
                plugin_id,
                ..
            }
            | SyncAction::PluginInstanceRemoved {
                component_id,
                plugin_id,
                ..
            } => self
                .plugin_instances
                .record(kind, format!("{component_id}:{plugin_id}")),
            SyncAction::Plugin { id, .. } => self.plugins.record(kind, id.clone()),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.components.has_changes()
            || self.plugin_instances.has_changes()
            || self.plugins.has_changes()
    }

    /// Folds a later run into this one (used by `sync`).
    pub fn merge(&mut self, other: SyncReport) {
        for (into, from) in [
            (&mut self.components, other.components),
            (&mut self.plugin_instances, other.plugin_instances),
            (&mut self.plugins, other.plugins),
        ] {
            into.created.extend(from.created);
            into.updated.extend(from.updated);
            into.unchanged.extend(from.unchanged);
            into.removed.extend(from.removed);
        }
    }
}
