//! Entity state: the primary value a snapshot reports.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary state of an entity.
///
/// Toggles report `On`/`Off`, locks `Locked`/`Unlocked`, sensors carry their
/// literal reading in `Value`. Any device that has been marked unavailable
/// reports `Unavailable` regardless of its underlying state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntityState {
    On,
    Off,
    Locked,
    Unlocked,
    #[default]
    Unknown,
    Unavailable,
    Value(String),
}

impl EntityState {
    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
            Self::Value(value) => value,
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "on" => Self::On,
            "off" => Self::Off,
            "locked" => Self::Locked,
            "unlocked" => Self::Unlocked,
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            other => Self::Value(other.to_string()),
        })
    }
}

impl Serialize for EntityState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(state) = raw.parse();
        Ok(state)
    }
}
