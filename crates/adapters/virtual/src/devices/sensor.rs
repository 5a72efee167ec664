//! Virtual sensor: holds whatever value it was last `set` to.

use mockhub_app::ports::{Device, RestoreStateStore};
use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::MockHubError;
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::SET;
use serde::Deserialize;
use serde_json::Value;

use super::{EntityCore, params};
use crate::config::SensorConfig;

#[derive(Debug, Deserialize)]
struct SetParams {
    value: Value,
}

/// Unit reported by a sensor of `device_class` when none is configured.
#[must_use]
pub fn default_unit(device_class: &str) -> Option<&'static str> {
    const MICROGRAMS_PER_CUBIC_METER: &str = "µg/m³";

    Some(match device_class {
        "apparent_power" => "VA",
        "battery" | "humidity" | "power_factor" => "%",
        "carbon_monoxide" | "carbon_dioxide" => "ppm",
        "current" => "A",
        "energy" => "kWh",
        "frequency" => "GHz",
        "gas" => "m³",
        "illuminance" => "lx",
        "nitrogen_dioxide"
        | "nitrogen_monoxide"
        | "nitrous_oxide"
        | "ozone"
        | "pm1"
        | "pm10"
        | "pm25"
        | "sulphur_dioxide"
        | "volatile_organic_compounds" => MICROGRAMS_PER_CUBIC_METER,
        "signal_strength" => "dB",
        "temperature" => "C",
        "pressure" => "hPa",
        "power" => "kW",
        "reactive_power" => "var",
        "voltage" => "V",
        _ => return None,
    })
}

pub struct VirtualSensor {
    core: EntityCore,
    value: String,
    unit_of_measurement: String,
}

impl VirtualSensor {
    /// Build a sensor. A `persistent` sensor starts from the last value
    /// `restore` knows for it, when there is one.
    #[must_use]
    pub fn new(name: &str, config: &SensorConfig, restore: &dyn RestoreStateStore) -> Self {
        let core = EntityCore::new(
            DeviceKind::Sensor,
            name,
            config.initial_availability,
            config.device_class.clone(),
        );
        let restored = config
            .persistent
            .then(|| restore.last_state(core.entity_id()))
            .flatten();
        let value = match restored {
            Some(state) => {
                tracing::debug!(entity_id = %core.entity_id(), %state, "restored sensor value");
                state.as_str().to_string()
            }
            None => config.initial_value.clone(),
        };
        let unit_of_measurement = if config.unit_of_measurement.is_empty() {
            config
                .device_class
                .as_deref()
                .and_then(default_unit)
                .unwrap_or_default()
                .to_string()
        } else {
            config.unit_of_measurement.clone()
        };
        Self {
            core,
            value,
            unit_of_measurement,
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn unit_of_measurement(&self) -> &str {
        &self.unit_of_measurement
    }

    /// Store `value` as-is. Strings are kept verbatim, anything else as its
    /// JSON text.
    pub fn set(&mut self, value: Value) {
        self.value = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
    }
}

impl Device for VirtualSensor {
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
        EntityState::Value(self.value.clone())
    }

    fn snapshot(&self) -> Entity {
        let unit = (!self.unit_of_measurement.is_empty()).then_some(self.unit_of_measurement.as_str());
        self.core
            .snapshot(self.state())
            .with_optional_attribute("unit_of_measurement", unit)
    }

    fn apply(&mut self, service: &str, data: &Value) -> Result<(), MockHubError> {
        if service != SET {
            return Err(self.core.unsupported(service));
        }
        let SetParams { value } = params(service, data)?;
        let before = self.value.clone();
        self.set(value);
        tracing::info!(entity_id = %self.core.entity_id(), value = %self.value, "set");
        self.core.touch(before != self.value);
        Ok(())
    }
}
