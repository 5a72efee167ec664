//! Service registry: installs handlers and dispatches calls to them.
//!
//! Handlers are grouped by [`ServiceDomain`]. Installing a domain a second
//! time is a no-op, so reloads never stack duplicate handlers. Each call is
//! resolved target by target: an unknown identifier fails that target alone.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockhub_domain::entity::Entity;
use mockhub_domain::error::{MockHubError, NotFoundError};
use mockhub_domain::event::Event;
use mockhub_domain::id::EntityId;
use mockhub_domain::service::{SET_AVAILABLE, ServiceCall, ServiceDomain, coerce_bool};
use serde_json::Value;

use super::entity_registry::EntityRegistry;
use crate::ports::{Device, EventPublisher, ServiceHandler, ServiceSet};

/// Routes service calls to the devices they target.
pub struct ServiceRegistry<P> {
    entities: Arc<EntityRegistry>,
    handlers: BTreeMap<ServiceDomain, BTreeMap<String, ServiceHandler>>,
    publisher: P,
}

impl<P: EventPublisher + Send + Sync> ServiceRegistry<P> {
    /// Create a registry with no handlers, over an empty set of entities.
    pub fn new(publisher: P) -> Self {
        Self {
            entities: Arc::default(),
            handlers: BTreeMap::new(),
            publisher,
        }
    }

    /// Point dispatch at a freshly loaded set of entities.
    pub fn attach(&mut self, entities: Arc<EntityRegistry>) {
        self.entities = entities;
    }

    #[must_use]
    pub fn entities(&self) -> &Arc<EntityRegistry> {
        &self.entities
    }

    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Install every handler of `set`, unless its domain is already installed.
    ///
    /// Returns `true` when the handlers were added.
    pub fn install(&mut self, set: ServiceSet) -> bool {
        if self.handlers.contains_key(&set.domain) {
            tracing::debug!(domain = %set.domain, "services already installed");
            return false;
        }
        let table = self.handlers.entry(set.domain).or_default();
        for (service, handler) in set.handlers {
            table.entry(service.to_string()).or_insert(handler);
        }
        tracing::info!(domain = %set.domain, count = table.len(), "services installed");
        true
    }

    /// Install `tester.set_available`, shared by every device kind.
    pub fn install_availability(&mut self) -> bool {
        let set = ServiceSet::new(ServiceDomain::Tester).with(SET_AVAILABLE, Arc::new(set_availability));
        self.install(set)
    }

    #[must_use]
    pub fn is_installed(&self, domain: ServiceDomain) -> bool {
        self.handlers.contains_key(&domain)
    }

    #[must_use]
    pub fn has_service(&self, domain: ServiceDomain, service: &str) -> bool {
        self.handlers
            .get(&domain)
            .is_some_and(|table| table.contains_key(service))
    }

    /// Qualified names of every installed service, sorted.
    #[must_use]
    pub fn services(&self) -> Vec<String> {
        self.handlers
            .iter()
            .flat_map(|(domain, table)| table.keys().map(move |service| format!("{domain}.{service}")))
            .collect()
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(BTreeMap::len).sum()
    }

    /// Run `call` against each of its targets.
    ///
    /// A `call_service` event is published first, then one `state_changed`
    /// event per target whose state or attributes the handler changed.
    ///
    /// # Errors
    ///
    /// Returns [`MockHubError::NotFound`] when the service is not installed.
    /// Failures of individual targets are reported in the [`DispatchReport`].
    #[tracing::instrument(skip(self, call), fields(service = %call.qualified_name()))]
    pub async fn dispatch(&self, call: &ServiceCall) -> Result<DispatchReport, MockHubError> {
        let handler = self
            .handlers
            .get(&call.domain)
            .and_then(|table| table.get(call.service.as_str()))
            .cloned()
            .ok_or_else(|| NotFoundError {
                entity: "Service",
                id: call.qualified_name(),
            })?;

        self.emit(Event::call_service(call)).await;

        let mut outcomes = Vec::with_capacity(call.targets.len());
        for target in &call.targets {
            let result = match self.run_on_target(&handler, call, target) {
                Ok((entity, true)) => {
                    self.emit(Event::state_changed(&entity)).await;
                    Ok(entity)
                }
                Ok((entity, false)) => {
                    tracing::debug!(entity = %target, "state unchanged");
                    Ok(entity)
                }
                Err(err) => {
                    tracing::warn!(entity = %target, error = %err, "service call failed for target");
                    Err(err)
                }
            };
            outcomes.push(TargetOutcome {
                target: target.clone(),
                result,
            });
        }
        Ok(DispatchReport { outcomes })
    }

    /// The entity after the handler ran, and whether it changed.
    fn run_on_target(
        &self,
        handler: &ServiceHandler,
        call: &ServiceCall,
        target: &str,
    ) -> Result<(Entity, bool), MockHubError> {
        let not_found = || NotFoundError {
            entity: "Entity",
            id: target.to_string(),
        };
        let id: EntityId = target.parse().map_err(|_| not_found())?;
        if !call.domain.accepts(id.kind()) {
            return Err(not_found().into());
        }
        self.entities.with_device(&id, |device| {
            let before = device.snapshot();
            handler(device, call)?;
            let after = device.snapshot();
            let changed = after.differs_from(&before);
            Ok((after, changed))
        })?
    }

    async fn emit(&self, event: Event) {
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(error = %err, "failed to publish event");
        }
    }
}

fn set_availability(device: &mut dyn Device, call: &ServiceCall) -> Result<(), MockHubError> {
    let value = call.data.get("value").unwrap_or(&Value::Null);
    let available = coerce_bool(value)?;
    tracing::info!(entity_id = %device.entity_id(), available, "set_available");
    device.set_available(available);
    Ok(())
}

/// What happened to one target of a call.
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    /// The entity after the call, or why the target was skipped.
    pub result: Result<Entity, MockHubError>,
}

/// Per-target results of a dispatched call, in target order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl DispatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Entities that were handled.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Targets that failed, with their error.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &MockHubError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (o.target.as_str(), err)))
    }
}
