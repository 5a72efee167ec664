//! Virtual toggle: switches and binary sensors, `turn_on` / `turn_off` / `toggle`.

use mockhub_app::ports::Device;
use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::MockHubError;
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{TOGGLE, TURN_OFF, TURN_ON};
use serde_json::Value;

use super::EntityCore;
use crate::config::ToggleConfig;

/// A simulated two-state device.
pub struct VirtualToggle {
    core: EntityCore,
    on: bool,
}

impl VirtualToggle {
    #[must_use]
    pub fn new(kind: DeviceKind, name: &str, config: &ToggleConfig) -> Self {
        Self {
            core: EntityCore::new(
                kind,
                name,
                config.initial_availability,
                config.device_class.clone(),
            ),
            on: config.initial_value == "on",
        }
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn turn_on(&mut self) {
        self.on = true;
    }

    pub fn turn_off(&mut self) {
        self.on = false;
    }

    pub fn toggle(&mut self) {
        self.on = !self.on;
    }
}

impl Device for VirtualToggle {
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
        if self.on {
            EntityState::On
        } else {
            EntityState::Off
        }
    }

    fn snapshot(&self) -> Entity {
        self.core.snapshot(self.state())
    }

    fn apply(&mut self, service: &str, _data: &Value) -> Result<(), MockHubError> {
        let before = self.on;
        match service {
            TURN_ON => self.turn_on(),
            TURN_OFF => self.turn_off(),
            TOGGLE => self.toggle(),
            other => return Err(self.core.unsupported(other)),
        }
        tracing::debug!(entity_id = %self.core.entity_id(), on = self.on, "{service}");
        self.core.touch(before != self.on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockhub_domain::error::RejectedCommand;
    use serde_json::json;

    fn switch() -> VirtualToggle {
        VirtualToggle::new(DeviceKind::Switch, "Porch", &ToggleConfig::default())
    }

    #[test]
    fn should_default_to_off() {
        assert_eq!(switch().snapshot().state, EntityState::Off);
    }

    #[test]
    fn should_start_on_when_configured() {
        let config = ToggleConfig {
            initial_value: "on".to_string(),
            ..ToggleConfig::default()
        };
        let sensor = VirtualToggle::new(DeviceKind::BinarySensor, "Door", &config);
        assert!(sensor.is_on());
    }

    #[test]
    fn should_end_on_after_on_off_toggle() {
        let mut device = switch();
        for service in [TURN_ON, TURN_OFF, TOGGLE] {
            device.apply(service, &json!({})).unwrap();
        }
        assert_eq!(device.snapshot().state, EntityState::On);
    }

    #[test]
    fn should_return_to_original_state_after_two_toggles() {
        for initial in ["on", "off"] {
            let config = ToggleConfig {
                initial_value: initial.to_string(),
                ..ToggleConfig::default()
            };
            let mut device = VirtualToggle::new(DeviceKind::BinarySensor, "Door", &config);
            let before = device.is_on();

            device.apply(TOGGLE, &Value::Null).unwrap();
            device.apply(TOGGLE, &Value::Null).unwrap();

            assert_eq!(device.is_on(), before);
        }
    }

    #[test]
    fn should_keep_state_while_unavailable() {
        let mut device = switch();
        device.apply(TURN_ON, &Value::Null).unwrap();
        device.set_available(false);
        assert_eq!(device.snapshot().state, EntityState::Unavailable);

        device.set_available(true);
        assert_eq!(device.snapshot().state, EntityState::On);
    }

    #[test]
    fn should_reject_unknown_service() {
        let mut device = switch();
        let result = device.apply("lock", &Value::Null);
        assert!(matches!(
            result,
            Err(MockHubError::Rejected(RejectedCommand::UnsupportedService { .. }))
        ));
        assert!(!device.is_on());
    }
}
