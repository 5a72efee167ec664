//! Device kinds: the platform a simulated device belongs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The platform a device is registered under.
///
/// The snake-case name doubles as the first half of every
/// [`EntityId`](crate::id::EntityId).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    BinarySensor,
    Fan,
    Light,
    Lock,
    Sensor,
    Switch,
}

impl DeviceKind {
    /// Every kind, in identifier order.
    pub const ALL: [Self; 6] = [
        Self::BinarySensor,
        Self::Fan,
        Self::Light,
        Self::Lock,
        Self::Sensor,
        Self::Switch,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinarySensor => "binary_sensor",
            Self::Fan => "fan",
            Self::Light => "light",
            Self::Lock => "lock",
            Self::Sensor => "sensor",
            Self::Switch => "switch",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownKind(s.to_string()))
    }
}
