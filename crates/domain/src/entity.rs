//! Entity: the read-only snapshot a simulated device exposes to callers.
//!
//! Devices own their mutable state; an [`Entity`] is what they hand out after
//! every transition so callers can read the result back.

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::time::Timestamp;

/// Point-in-time view of a device: identity, state and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Start a snapshot with no attributes.
    #[must_use]
    pub fn new(
        entity_id: EntityId,
        friendly_name: impl Into<String>,
        state: EntityState,
        last_changed: Timestamp,
        last_updated: Timestamp,
    ) -> Self {
        Self {
            entity_id,
            friendly_name: friendly_name.into(),
            state,
            attributes: BTreeMap::new(),
            last_changed,
            last_updated,
        }
    }

    /// Attach an attribute, replacing any previous value under `key`.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach an attribute only when a value is present.
    #[must_use]
    pub fn with_optional_attribute<V: Into<AttributeValue>>(
        self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.with_attribute(key, value),
            None => self,
        }
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Whether the device was reachable when the snapshot was taken.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// Whether state or attributes differ from `earlier`. Timestamps are
    /// ignored.
    #[must_use]
    pub fn differs_from(&self, earlier: &Entity) -> bool {
        self.state != earlier.state || self.attributes != earlier.attributes
    }
}
