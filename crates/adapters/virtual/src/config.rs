//! Device records of the virtual integration.
//!
//! Each record is tagged by `platform` and carries that platform's keys.
//! Unknown keys are ignored. `name` is declared optional here so that one
//! record missing it fails on its own when the device is built, instead of
//! failing the whole file.

use mockhub_domain::capability::HsColor;
use mockhub_domain::kind::DeviceKind;
use serde::Deserialize;

/// The `[virtual]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    pub devices: Vec<DeviceConfig>,
}

impl VirtualConfig {
    /// Kinds with at least one configured record.
    #[must_use]
    pub fn kinds(&self) -> Vec<DeviceKind> {
        let mut kinds: Vec<_> = self.devices.iter().map(DeviceConfig::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}

/// One `[[virtual.devices]]` record.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum DeviceConfig {
    BinarySensor(ToggleConfig),
    Switch(ToggleConfig),
    Lock(LockConfig),
    Light(LightConfig),
    Fan(FanConfig),
    Sensor(SensorConfig),
}

impl DeviceConfig {
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::BinarySensor(_) => DeviceKind::BinarySensor,
            Self::Switch(_) => DeviceKind::Switch,
            Self::Lock(_) => DeviceKind::Lock,
            Self::Light(_) => DeviceKind::Light,
            Self::Fan(_) => DeviceKind::Fan,
            Self::Sensor(_) => DeviceKind::Sensor,
        }
    }

    /// The configured display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::BinarySensor(c) | Self::Switch(c) => c.name.as_deref(),
            Self::Lock(c) => c.name.as_deref(),
            Self::Light(c) => c.name.as_deref(),
            Self::Fan(c) => c.name.as_deref(),
            Self::Sensor(c) => c.name.as_deref(),
        }
    }
}

/// Keys of `binary_sensor` and `switch` records.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    pub name: Option<String>,
    #[serde(rename = "class")]
    pub device_class: Option<String>,
    pub initial_value: String,
    pub initial_availability: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            name: None,
            device_class: None,
            initial_value: "off".to_string(),
            initial_availability: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub name: Option<String>,
    pub initial_value: String,
    pub initial_availability: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            name: None,
            initial_value: "locked".to_string(),
            initial_availability: true,
        }
    }
}

/// Keys of `light` records. Initial values only apply when the matching
/// `support_*` flag is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub name: Option<String>,
    pub initial_value: String,
    pub support_brightness: bool,
    pub initial_brightness: u8,
    pub support_color: bool,
    pub initial_color: HsColor,
    pub support_color_temp: bool,
    pub initial_color_temp: u16,
    pub support_effect: bool,
    pub initial_effect: String,
    pub initial_effect_list: Vec<String>,
    pub initial_availability: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            name: None,
            initial_value: "on".to_string(),
            support_brightness: true,
            initial_brightness: 255,
            support_color: false,
            initial_color: HsColor {
                hue: 0.0,
                saturation: 100.0,
            },
            support_color_temp: false,
            initial_color_temp: 240,
            support_effect: false,
            initial_effect: "none".to_string(),
            initial_effect_list: vec!["rainbow".to_string(), "none".to_string()],
            initial_availability: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    pub name: Option<String>,
    /// Shorthand for three speeds; wins over `speed_count`.
    pub speed: bool,
    pub speed_count: u32,
    pub oscillate: bool,
    pub direction: bool,
    /// Allowed preset modes.
    pub modes: Vec<String>,
    pub initial_availability: bool,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            name: None,
            speed: false,
            speed_count: 0,
            oscillate: false,
            direction: false,
            modes: Vec::new(),
            initial_availability: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub name: Option<String>,
    #[serde(rename = "class")]
    pub device_class: Option<String>,
    pub initial_value: String,
    /// Empty means "derive from the device class".
    pub unit_of_measurement: String,
    /// Start from the last known value instead of `initial_value`.
    pub persistent: bool,
    pub initial_availability: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            name: None,
            device_class: None,
            initial_value: "0".to_string(),
            unit_of_measurement: String::new(),
            persistent: false,
            initial_availability: true,
        }
    }
}
