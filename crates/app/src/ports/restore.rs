//! Restore port: last known states for devices that opt into restoring them.

use std::collections::HashMap;

use mockhub_domain::entity::EntityState;
use mockhub_domain::id::EntityId;

/// Source of the last state an entity reported before the platform (re)loaded.
pub trait RestoreStateStore {
    fn last_state(&self, entity_id: &EntityId) -> Option<EntityState>;
}

/// Store that never remembers anything. Used on first start.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRestore;

impl RestoreStateStore for NoRestore {
    fn last_state(&self, _entity_id: &EntityId) -> Option<EntityState> {
        None
    }
}

impl RestoreStateStore for HashMap<EntityId, EntityState> {
    fn last_state(&self, entity_id: &EntityId) -> Option<EntityState> {
        self.get(entity_id).cloned()
    }
}
