//! Platform: loads an integration and serves calls against its devices.

use std::sync::Arc;

use mockhub_domain::entity::Entity;
use mockhub_domain::error::{MockHubError, NotFoundError};
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{ServiceCall, ServiceDomain};

use super::entity_registry::EntityRegistry;
use super::service_registry::{DispatchReport, ServiceRegistry};
use crate::ports::{EventPublisher, Integration, SetupFailure};

/// Result of loading (or reloading) one integration.
#[derive(Debug)]
pub struct LoadReport {
    pub integration: &'static str,
    /// Identifiers of the devices now registered, in creation order.
    pub entities: Vec<EntityId>,
    pub failures: Vec<SetupFailure>,
    /// Service domains installed by this load. Empty on reload.
    pub installed: Vec<ServiceDomain>,
}

/// The running set of devices and the services that drive them.
pub struct Platform<P> {
    services: ServiceRegistry<P>,
}

impl<P: EventPublisher + Send + Sync> Platform<P> {
    /// Create an empty platform with `tester.set_available` already installed.
    pub fn new(publisher: P) -> Self {
        let mut services = ServiceRegistry::new(publisher);
        services.install_availability();
        Self { services }
    }

    /// Build the integration's devices and install its services.
    ///
    /// The previous devices are replaced wholesale; devices that restore their
    /// state read it from the ones being replaced.
    #[tracing::instrument(skip_all, fields(integration = integration.name()))]
    pub fn load(&mut self, integration: &mut impl Integration) -> LoadReport {
        let outcome = integration.setup(self.services.entities().as_ref());
        let mut failures = outcome.failures;

        let mut registry = EntityRegistry::default();
        let mut entities = Vec::with_capacity(outcome.devices.len());
        for device in outcome.devices {
            let name = device.name().to_string();
            match registry.register(device) {
                Ok(id) => entities.push(id),
                Err(error) => {
                    tracing::warn!(%name, %error, "device skipped");
                    failures.push(SetupFailure {
                        index: None,
                        name: Some(name),
                        error,
                    });
                }
            }
        }
        self.services.attach(Arc::new(registry));

        let installed = integration
            .services()
            .into_iter()
            .filter_map(|set| {
                let domain = set.domain;
                self.services.install(set).then_some(domain)
            })
            .collect();

        tracing::info!(
            entities = entities.len(),
            failures = failures.len(),
            "integration loaded"
        );
        LoadReport {
            integration: integration.name(),
            entities,
            failures,
            installed,
        }
    }

    #[must_use]
    pub fn entities(&self) -> &EntityRegistry {
        self.services.entities()
    }

    #[must_use]
    pub fn services(&self) -> &ServiceRegistry<P> {
        &self.services
    }

    /// Current snapshot of the entity named `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MockHubError::NotFound`] when the identifier is malformed or
    /// names no loaded device.
    pub fn state(&self, entity_id: &str) -> Result<Entity, MockHubError> {
        let id: EntityId = entity_id.parse().map_err(|_| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;
        self.entities().get(&id)
    }

    /// Snapshots of every loaded device of `kind`.
    #[must_use]
    pub fn entities_of(&self, kind: DeviceKind) -> Vec<Entity> {
        self.entities().entities_of(kind)
    }

    /// Dispatch a service call.
    ///
    /// # Errors
    ///
    /// See [`ServiceRegistry::dispatch`].
    pub async fn call(&self, call: &ServiceCall) -> Result<DispatchReport, MockHubError> {
        self.services.dispatch(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeIntegration, RecordingPublisher};
    use mockhub_domain::entity::EntityState;
    use mockhub_domain::error::ValidationError;
    use mockhub_domain::service::{SET_AVAILABLE, TURN_ON};
    use serde_json::json;

    fn platform() -> Platform<Arc<RecordingPublisher>> {
        Platform::new(Arc::new(RecordingPublisher::default()))
    }

    #[test]
    fn should_install_availability_before_any_load() {
        let platform = platform();
        assert!(platform.services().has_service(ServiceDomain::Tester, SET_AVAILABLE));
        assert!(platform.entities().is_empty());
    }

    #[test]
    fn should_register_devices_and_services_on_load() {
        let mut platform = platform();
        let mut integration = FakeIntegration::switches(&["Porch", "Hall"]);

        let report = platform.load(&mut integration);

        assert_eq!(report.integration, "fake");
        assert_eq!(report.entities.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(report.installed, vec![ServiceDomain::Kind(DeviceKind::Switch)]);
        assert_eq!(platform.entities_of(DeviceKind::Switch).len(), 2);
    }

    #[test]
    fn should_report_duplicate_names_as_failures() {
        let mut platform = platform();
        let mut integration = FakeIntegration::switches(&["Porch", "porch"]);

        let report = platform.load(&mut integration);

        assert_eq!(report.entities.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            MockHubError::Validation(ValidationError::DuplicateEntityId(_))
        ));
    }

    #[test]
    fn should_not_duplicate_handlers_on_reload() {
        let mut platform = platform();
        let mut integration = FakeIntegration::switches(&["Porch"]);
        platform.load(&mut integration);
        let handlers = platform.services().handler_count();

        let report = platform.load(&mut integration);

        assert!(report.installed.is_empty());
        assert_eq!(platform.services().handler_count(), handlers);
    }

    #[test]
    fn should_replace_devices_on_reload() {
        let mut platform = platform();
        platform.load(&mut FakeIntegration::switches(&["Porch", "Hall"]));
        platform.load(&mut FakeIntegration::switches(&["Attic"]));

        assert!(platform.state("switch.attic").is_ok());
        assert!(matches!(platform.state("switch.porch"), Err(MockHubError::NotFound(_))));
    }

    #[test]
    fn should_return_not_found_for_malformed_id() {
        let platform = platform();
        assert!(matches!(platform.state("porch"), Err(MockHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_dispatch_calls_to_loaded_devices() {
        let mut platform = platform();
        platform.load(&mut FakeIntegration::switches(&["Porch"]));
        let call = ServiceCall::new(DeviceKind::Switch.into(), TURN_ON, ["switch.porch"], json!({}));

        let report = platform.call(&call).await.unwrap();

        assert!(report.is_success());
        assert_eq!(platform.state("switch.porch").unwrap().state, EntityState::On);
    }
}
