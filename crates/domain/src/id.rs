//! Entity identifiers derived from display names.
//!
//! An identifier is `<kind>.<object_id>` where the object id is the display
//! name lowercased with spaces replaced by underscores. The same name always
//! yields the same identifier, so identifiers stay stable across reloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::kind::DeviceKind;

/// Fully qualified identifier of a simulated entity, e.g. `light.kitchen_lamp`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    kind: DeviceKind,
    object_id: String,
}

impl EntityId {
    /// Derive the identifier for a device named `name` on platform `kind`.
    #[must_use]
    pub fn from_name(kind: DeviceKind, name: &str) -> Self {
        Self {
            kind,
            object_id: name.to_lowercase().replace(' ', "_"),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.object_id)
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, object_id) = s
            .split_once('.')
            .filter(|(_, object_id)| !object_id.is_empty())
            .ok_or_else(|| ValidationError::InvalidEntityId(s.to_string()))?;
        Ok(Self {
            kind: kind.parse()?,
            object_id: object_id.to_string(),
        })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Unique identifier for an [`Event`](crate::event::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(uuid::Uuid);

impl Default for EventId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl EventId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
