//! Entity registry: the identifier → device lookup table.
//!
//! Filled once per platform load, read (and mutated through) afterwards.
//! Nothing is inserted or removed at runtime, so each device sits behind its
//! own mutex and the map itself needs no locking.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::{MockHubError, NotFoundError, ValidationError};
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;

use crate::ports::{Device, RestoreStateStore};

/// Owner of every simulated device.
#[derive(Default)]
pub struct EntityRegistry {
    devices: BTreeMap<EntityId, Mutex<Box<dyn Device>>>,
}

impl EntityRegistry {
    /// Take ownership of `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateEntityId`] when a device of the same
    /// kind already derived the same identifier.
    pub fn register(&mut self, device: Box<dyn Device>) -> Result<EntityId, MockHubError> {
        let id = device.entity_id().clone();
        if self.devices.contains_key(&id) {
            return Err(ValidationError::DuplicateEntityId(id.to_string()).into());
        }
        self.devices.insert(id.clone(), Mutex::new(device));
        Ok(id)
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.devices.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Snapshot of a single entity.
    ///
    /// # Errors
    ///
    /// Returns [`MockHubError::NotFound`] when no device has `id`.
    pub fn get(&self, id: &EntityId) -> Result<Entity, MockHubError> {
        self.with_device(id, |device| device.snapshot())
    }

    /// Run `f` with exclusive access to the device behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MockHubError::NotFound`] when no device has `id`.
    pub fn with_device<R>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut dyn Device) -> R,
    ) -> Result<R, MockHubError> {
        let slot = self.devices.get(id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: id.to_string(),
        })?;
        let mut device = lock(slot);
        Ok(f(device.as_mut()))
    }

    /// Snapshots of every device of one kind, in identifier order.
    #[must_use]
    pub fn entities_of(&self, kind: DeviceKind) -> Vec<Entity> {
        self.devices
            .iter()
            .filter(|(id, _)| id.kind() == kind)
            .map(|(_, slot)| lock(slot).snapshot())
            .collect()
    }

    /// Snapshots of every device, in identifier order.
    #[must_use]
    pub fn list(&self) -> Vec<Entity> {
        self.devices.values().map(|slot| lock(slot).snapshot()).collect()
    }
}

/// Reloading restores from the registry being replaced. Availability is not
/// part of the restored value.
impl RestoreStateStore for EntityRegistry {
    fn last_state(&self, entity_id: &EntityId) -> Option<EntityState> {
        let slot = self.devices.get(entity_id)?;
        let state = lock(slot).state();
        match state {
            EntityState::Unknown | EntityState::Unavailable => None,
            known => Some(known),
        }
    }
}

fn lock(slot: &Mutex<Box<dyn Device>>) -> MutexGuard<'_, Box<dyn Device>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
