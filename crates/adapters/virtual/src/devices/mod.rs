//! Virtual device implementations: toggle, lock, light, fan, sensor.
//!
//! Every device shares an [`EntityCore`] (identity, availability,
//! timestamps) and adds its own state on top. Snapshots of an unavailable
//! device report [`EntityState::Unavailable`] but keep their attributes.

mod fan;
mod light;
mod lock;
mod sensor;
mod toggle;

pub use fan::VirtualFan;
pub use light::{LightTurnOn, VirtualLight};
pub use lock::VirtualLock;
pub use sensor::{VirtualSensor, default_unit};
pub use toggle::VirtualToggle;

use mockhub_app::ports::{Device, RestoreStateStore};
use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::{ConfigurationError, MockHubError, RejectedCommand, ValidationError};
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::time::Stamps;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::DeviceConfig;

/// Build the device described by `config`.
///
/// # Errors
///
/// Returns [`ConfigurationError::MissingField`] when the record has no usable
/// `name`.
pub fn build(
    config: &DeviceConfig,
    restore: &dyn RestoreStateStore,
) -> Result<Box<dyn Device>, MockHubError> {
    let kind = config.kind();
    let name = config
        .name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ConfigurationError::MissingField {
            platform: kind,
            field: "name",
        })?;

    Ok(match config {
        DeviceConfig::BinarySensor(c) | DeviceConfig::Switch(c) => {
            Box::new(VirtualToggle::new(kind, name, c))
        }
        DeviceConfig::Lock(c) => Box::new(VirtualLock::new(name, c)),
        DeviceConfig::Light(c) => Box::new(VirtualLight::new(name, c)),
        DeviceConfig::Fan(c) => Box::new(VirtualFan::new(name, c)),
        DeviceConfig::Sensor(c) => Box::new(VirtualSensor::new(name, c, restore)),
    })
}

/// Identity and availability shared by every virtual device.
#[derive(Debug, Clone)]
pub(crate) struct EntityCore {
    entity_id: EntityId,
    name: String,
    available: bool,
    device_class: Option<String>,
    stamps: Stamps,
}

impl EntityCore {
    pub(crate) fn new(
        kind: DeviceKind,
        name: &str,
        available: bool,
        device_class: Option<String>,
    ) -> Self {
        Self {
            entity_id: EntityId::from_name(kind, name),
            name: name.to_string(),
            available,
            device_class,
            stamps: Stamps::new(),
        }
    }

    pub(crate) fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_available(&self) -> bool {
        self.available
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        let changed = self.available != available;
        self.available = available;
        self.touch(changed);
    }

    pub(crate) fn touch(&mut self, changed: bool) {
        self.stamps.touch(changed);
    }

    /// Snapshot with the common attributes, reporting `state` when available.
    pub(crate) fn snapshot(&self, state: EntityState) -> Entity {
        let state = if self.available {
            state
        } else {
            EntityState::Unavailable
        };
        Entity::new(
            self.entity_id.clone(),
            &self.name,
            state,
            self.stamps.last_changed,
            self.stamps.last_updated,
        )
        .with_attribute("friendly_name", self.name.as_str())
        .with_attribute("unique_id", self.entity_id.object_id())
        .with_optional_attribute("device_class", self.device_class.clone())
    }

    pub(crate) fn unsupported(&self, service: &str) -> MockHubError {
        RejectedCommand::UnsupportedService {
            kind: self.entity_id.kind(),
            service: service.to_string(),
        }
        .into()
    }
}

/// Decode the parameters of `service`. A missing payload reads as `{}`.
pub(crate) fn params<T: DeserializeOwned>(service: &str, data: &Value) -> Result<T, MockHubError> {
    let data = if data.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        data.clone()
    };
    serde_json::from_value(data).map_err(|source| {
        ValidationError::InvalidPayload {
            service: service.to_string(),
            source,
        }
        .into()
    })
}
