//! Event: an immutable record of something that happened.
//!
//! The dispatcher emits one [`EventType::CallService`] per service call and
//! one [`EventType::StateChanged`] per successfully mutated target.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{EntityId, EventId};
use crate::service::ServiceCall;
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CallService,
    StateChanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }

    /// Record that `call` was received.
    #[must_use]
    pub fn call_service(call: &ServiceCall) -> Self {
        Self::new(
            EventType::CallService,
            None,
            serde_json::json!({
                "domain": call.domain,
                "service": call.service,
                "service_data": call.data,
                "targets": call.targets,
            }),
        )
    }

    /// Record the snapshot a device reported after a transition.
    #[must_use]
    pub fn state_changed(new_state: &Entity) -> Self {
        Self::new(
            EventType::StateChanged,
            Some(new_state.entity_id.clone()),
            serde_json::json!({ "new_state": new_state }),
        )
    }
}
