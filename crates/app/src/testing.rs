//! Test doubles shared by the unit tests of this crate.

use std::future::Future;
use std::sync::Mutex;

use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::{MockHubError, RejectedCommand};
use mockhub_domain::event::Event;
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::time::now;

use crate::ports::{
    Device, EventPublisher, Integration, RestoreStateStore, ServiceSet, SetupOutcome,
};

/// Minimal on/off device that refuses everything but the toggle services.
pub struct FakeToggle {
    id: EntityId,
    name: String,
    on: bool,
    available: bool,
}

impl FakeToggle {
    pub fn new(kind: DeviceKind, name: &str) -> Self {
        Self {
            id: EntityId::from_name(kind, name),
            name: name.to_string(),
            on: false,
            available: true,
        }
    }
}

impl Device for FakeToggle {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    fn state(&self) -> EntityState {
        if self.on {
            EntityState::On
        } else {
            EntityState::Off
        }
    }

    fn snapshot(&self) -> Entity {
        let state = if self.available {
            self.state()
        } else {
            EntityState::Unavailable
        };
        let ts = now();
        Entity::new(self.id.clone(), &self.name, state, ts, ts)
    }

    fn apply(&mut self, service: &str, _data: &serde_json::Value) -> Result<(), MockHubError> {
        match service {
            "turn_on" => self.on = true,
            "turn_off" => self.on = false,
            "toggle" => self.on = !self.on,
            other => {
                return Err(RejectedCommand::UnsupportedService {
                    kind: self.id.kind(),
                    service: other.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Publisher that keeps every event it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<Event>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(
        &self,
        event: Event,
    ) -> impl Future<Output = Result<(), MockHubError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}

/// Integration creating one [`FakeToggle`] switch per name.
pub struct FakeIntegration {
    names: Vec<String>,
}

impl FakeIntegration {
    pub fn switches(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Integration for FakeIntegration {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn setup(&mut self, _restore: &dyn RestoreStateStore) -> SetupOutcome {
        SetupOutcome {
            devices: self
                .names
                .iter()
                .map(|name| Box::new(FakeToggle::new(DeviceKind::Switch, name)) as Box<dyn Device>)
                .collect(),
            failures: Vec::new(),
        }
    }

    fn services(&self) -> Vec<ServiceSet> {
        vec![ServiceSet::forwarding(
            DeviceKind::Switch,
            &["turn_on", "turn_off", "toggle"],
        )]
    }
}
