//! # mockhub-adapter-virtual
//!
//! Virtual integration that builds simulated devices from configuration.
//!
//! ## Provided devices
//!
//! | Platform | Services | Behaviour |
//! |----------|----------|-----------|
//! | `binary_sensor` | `turn_on` / `turn_off` / `toggle` | Two-state, optional device class |
//! | `switch` | `turn_on` / `turn_off` / `toggle` | Two-state |
//! | `lock` | `lock` / `unlock` / `open` | `open` is a no-op |
//! | `light` | `turn_on` / `turn_off` | Brightness, hs color, color temperature, effects |
//! | `fan` | `turn_on` / `turn_off` / `set_percentage` / `set_preset_mode` / `set_direction` / `oscillate` | Percentage or preset mode |
//! | `sensor` | `set` | Literal value, unit derived from device class |
//!
//! Every device also answers to `tester.set_available`, installed by the
//! platform itself.
//!
//! ## Dependency rule
//!
//! Depends on `mockhub-app` (port traits) and `mockhub-domain` only.

pub mod config;
mod devices;

use mockhub_app::ports::{Integration, RestoreStateStore, ServiceSet, SetupFailure, SetupOutcome};
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{
    LOCK, OPEN, OSCILLATE, SET, SET_DIRECTION, SET_PERCENTAGE, SET_PRESET_MODE, TOGGLE, TURN_OFF,
    TURN_ON, UNLOCK,
};

pub use config::{DeviceConfig, VirtualConfig};
pub use devices::{
    LightTurnOn, VirtualFan, VirtualLight, VirtualLock, VirtualSensor, VirtualToggle,
    default_unit,
};

/// Virtual integration that creates simulated devices.
#[derive(Debug, Clone, Default)]
pub struct VirtualIntegration {
    config: VirtualConfig,
}

impl VirtualIntegration {
    #[must_use]
    pub fn new(config: VirtualConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &VirtualConfig {
        &self.config
    }

    /// Swap in a new configuration, picked up by the next setup.
    pub fn reconfigure(&mut self, config: VirtualConfig) {
        self.config = config;
    }
}

impl Integration for VirtualIntegration {
    fn name(&self) -> &'static str {
        "virtual"
    }

    fn setup(&mut self, restore: &dyn RestoreStateStore) -> SetupOutcome {
        let mut outcome = SetupOutcome::default();
        for (index, record) in self.config.devices.iter().enumerate() {
            match devices::build(record, restore) {
                Ok(device) => {
                    tracing::info!(
                        entity_id = %device.entity_id(),
                        name = device.name(),
                        "virtual device created"
                    );
                    outcome.devices.push(device);
                }
                Err(error) => {
                    tracing::warn!(index, kind = %record.kind(), %error, "virtual device skipped");
                    outcome.failures.push(SetupFailure {
                        index: Some(index),
                        name: record.name().map(str::to_string),
                        error,
                    });
                }
            }
        }
        outcome
    }

    fn services(&self) -> Vec<ServiceSet> {
        self.config
            .kinds()
            .into_iter()
            .map(|kind| ServiceSet::forwarding(kind, services_of(kind)))
            .collect()
    }
}

/// Per-kind services; `tester.set_available` is shared and not listed here.
#[must_use]
pub fn services_of(kind: DeviceKind) -> &'static [&'static str] {
    match kind {
        DeviceKind::BinarySensor | DeviceKind::Switch => &[TURN_ON, TURN_OFF, TOGGLE],
        DeviceKind::Lock => &[LOCK, UNLOCK, OPEN],
        DeviceKind::Light => &[TURN_ON, TURN_OFF],
        DeviceKind::Fan => &[
            TURN_ON,
            TURN_OFF,
            SET_PERCENTAGE,
            SET_PRESET_MODE,
            SET_DIRECTION,
            OSCILLATE,
        ],
        DeviceKind::Sensor => &[SET],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockhub_app::event_bus::InProcessEventBus;
    use mockhub_app::ports::NoRestore;
    use mockhub_app::services::platform::Platform;
    use mockhub_domain::entity::{AttributeValue, EntityState};
    use mockhub_domain::error::{ConfigurationError, MockHubError};
    use mockhub_domain::service::{SET_AVAILABLE, ServiceCall, ServiceDomain};
    use serde_json::json;
    use std::sync::Arc;

    const CONFIG: &str = r#"
        [[devices]]
        platform = "switch"
        name = "Porch Light"

        [[devices]]
        platform = "binary_sensor"
        name = "Front Door"
        class = "door"

        [[devices]]
        platform = "lock"
        name = "Gate"

        [[devices]]
        platform = "light"
        name = "Desk Lamp"
        support_color = true
        support_color_temp = true

        [[devices]]
        platform = "fan"
        name = "Ceiling"
        speed = true
        modes = ["auto", "eco"]

        [[devices]]
        platform = "sensor"
        name = "Outside"
        class = "humidity"
        persistent = true

        [[devices]]
        platform = "switch"
    "#;

    fn integration() -> VirtualIntegration {
        VirtualIntegration::new(toml::from_str(CONFIG).unwrap())
    }

    fn platform() -> (Platform<Arc<InProcessEventBus>>, VirtualIntegration) {
        let mut integration = integration();
        let mut platform = Platform::new(Arc::new(InProcessEventBus::new(16)));
        platform.load(&mut integration);
        (platform, integration)
    }

    #[test]
    fn should_return_virtual_as_name() {
        assert_eq!(VirtualIntegration::default().name(), "virtual");
    }

    #[test]
    fn should_create_every_named_device() {
        let outcome = integration().setup(&NoRestore);

        let ids: Vec<_> = outcome
            .devices
            .iter()
            .map(|d| d.entity_id().to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                "switch.porch_light",
                "binary_sensor.front_door",
                "lock.gate",
                "light.desk_lamp",
                "fan.ceiling",
                "sensor.outside",
            ]
        );
    }

    #[test]
    fn should_fail_only_the_record_without_name() {
        let outcome = integration().setup(&NoRestore);

        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert_eq!(failure.index, Some(6));
        assert!(matches!(
            failure.error,
            MockHubError::Configuration(ConfigurationError::MissingField {
                platform: DeviceKind::Switch,
                ..
            })
        ));
    }

    #[test]
    fn should_install_services_for_configured_kinds_only() {
        let integration = VirtualIntegration::new(
            toml::from_str("[[devices]]\nplatform = \"lock\"\nname = \"Gate\"\n").unwrap(),
        );
        let sets = integration.services();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].domain, ServiceDomain::Kind(DeviceKind::Lock));
        assert_eq!(sets[0].handlers.len(), 3);
    }

    #[tokio::test]
    async fn should_route_calls_to_each_kind() {
        let (platform, _) = platform();
        let calls = [
            (DeviceKind::Switch, TURN_ON, "switch.porch_light", json!({})),
            (DeviceKind::BinarySensor, TOGGLE, "binary_sensor.front_door", json!({})),
            (DeviceKind::Lock, UNLOCK, "lock.gate", json!({})),
            (DeviceKind::Light, TURN_OFF, "light.desk_lamp", json!({})),
            (DeviceKind::Fan, SET_PRESET_MODE, "fan.ceiling", json!({"preset_mode": "eco"})),
            (DeviceKind::Sensor, SET, "sensor.outside", json!({"value": "55"})),
        ];
        for (kind, service, target, data) in calls {
            let call = ServiceCall::new(kind.into(), service, [target], data);
            let report = platform.call(&call).await.unwrap();
            assert!(report.is_success(), "{service} on {target}");
        }

        assert_eq!(platform.state("switch.porch_light").unwrap().state, EntityState::On);
        assert_eq!(platform.state("binary_sensor.front_door").unwrap().state, EntityState::On);
        assert_eq!(platform.state("lock.gate").unwrap().state, EntityState::Unlocked);
        assert_eq!(platform.state("light.desk_lamp").unwrap().state, EntityState::Off);
        assert_eq!(
            platform.state("fan.ceiling").unwrap().get_attribute("preset_mode"),
            Some(&AttributeValue::from("eco"))
        );
        assert_eq!(
            platform.state("sensor.outside").unwrap().state,
            EntityState::Value("55".to_string())
        );
    }

    #[tokio::test]
    async fn should_toggle_availability_across_kinds() {
        let (platform, _) = platform();
        let call = ServiceCall::from_service_data(
            ServiceDomain::Tester,
            SET_AVAILABLE,
            json!({"entity_id": "lock.gate, fan.ceiling, light.missing", "value": "off"}),
        )
        .unwrap();

        let report = platform.call(&call).await.unwrap();

        assert_eq!(report.entities().count(), 2);
        assert_eq!(report.failures().map(|(t, _)| t).collect::<Vec<_>>(), vec!["light.missing"]);
        assert_eq!(platform.state("lock.gate").unwrap().state, EntityState::Unavailable);
        assert_eq!(platform.state("fan.ceiling").unwrap().state, EntityState::Unavailable);
        assert_eq!(platform.state("switch.porch_light").unwrap().state, EntityState::Off);
    }

    #[tokio::test]
    async fn should_restore_persistent_sensor_on_reload() {
        let (mut platform, mut integration) = platform();
        let call = ServiceCall::new(
            DeviceKind::Sensor.into(),
            SET,
            ["sensor.outside"],
            json!({ "value": 61 }),
        );
        platform.call(&call).await.unwrap();

        let report = platform.load(&mut integration);

        assert!(report.installed.is_empty());
        assert_eq!(
            platform.state("sensor.outside").unwrap().state,
            EntityState::Value("61".to_string())
        );
        assert_eq!(
            platform.state("sensor.outside").unwrap().get_attribute("unit_of_measurement"),
            Some(&AttributeValue::from("%"))
        );
    }

    #[tokio::test]
    async fn should_restore_persistent_sensor_left_unavailable() {
        let (mut platform, mut integration) = platform();
        let availability = |value: bool| {
            ServiceCall::new(
                ServiceDomain::Tester,
                SET_AVAILABLE,
                ["sensor.outside"],
                json!({ "value": value }),
            )
        };
        let set = ServiceCall::new(
            DeviceKind::Sensor.into(),
            SET,
            ["sensor.outside"],
            json!({ "value": "61" }),
        );
        platform.call(&set).await.unwrap();
        platform.call(&availability(false)).await.unwrap();

        platform.load(&mut integration);
        platform.call(&availability(true)).await.unwrap();

        assert_eq!(
            platform.state("sensor.outside").unwrap().state,
            EntityState::Value("61".to_string())
        );
    }

    #[tokio::test]
    async fn should_reset_non_persistent_devices_on_reload() {
        let (mut platform, mut integration) = platform();
        let call = ServiceCall::new(DeviceKind::Lock.into(), UNLOCK, ["lock.gate"], json!({}));
        platform.call(&call).await.unwrap();

        platform.load(&mut integration);

        assert_eq!(platform.state("lock.gate").unwrap().state, EntityState::Locked);
    }

    #[test]
    fn should_keep_one_handler_per_service_across_reloads() {
        let (mut platform, mut integration) = platform();
        let handlers = platform.services().handler_count();

        for _ in 0..3 {
            platform.load(&mut integration);
        }

        assert_eq!(platform.services().handler_count(), handlers);
        // 1 shared + 3 switch + 3 binary sensor + 3 lock + 2 light + 6 fan + 1 sensor
        assert_eq!(handlers, 19);
    }
}
