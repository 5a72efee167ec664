//! Virtual lock: `lock` / `unlock`; `open` is accepted and does nothing.

use mockhub_app::ports::Device;
use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::MockHubError;
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{LOCK, OPEN, UNLOCK};
use serde_json::Value;

use super::EntityCore;
use crate::config::LockConfig;

pub struct VirtualLock {
    core: EntityCore,
    locked: bool,
}

impl VirtualLock {
    #[must_use]
    pub fn new(name: &str, config: &LockConfig) -> Self {
        Self {
            core: EntityCore::new(DeviceKind::Lock, name, config.initial_availability, None),
            locked: config.initial_value == "locked",
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Latch release is not simulated.
    #[allow(clippy::unused_self)]
    pub fn open(&mut self) {}
}

impl Device for VirtualLock {
    fn entity_id(&self) -> &EntityId {
        self.core.entity_id()
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn set_available(&mut self, available: bool) {
        self.core.set_available(available);
    }

    fn state(&self) -> EntityState {
        if self.locked {
            EntityState::Locked
        } else {
            EntityState::Unlocked
        }
    }

    fn snapshot(&self) -> Entity {
        self.core.snapshot(self.state())
    }

    fn apply(&mut self, service: &str, _data: &Value) -> Result<(), MockHubError> {
        let before = self.locked;
        match service {
            LOCK => self.lock(),
            UNLOCK => self.unlock(),
            OPEN => self.open(),
            other => return Err(self.core.unsupported(other)),
        }
        tracing::debug!(entity_id = %self.core.entity_id(), locked = self.locked, "{service}");
        self.core.touch(before != self.locked);
        Ok(())
    }
}
