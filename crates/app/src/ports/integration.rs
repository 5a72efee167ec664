//! Integration port: builds devices from configuration and names the
//! services that drive them.
//!
//! The [`Platform`](crate::services::platform::Platform) calls the methods in
//! order on every load:
//!
//! 1. [`setup`](Integration::setup): create every configured device
//! 2. [`services`](Integration::services): the handler sets to install
//!
//! Installing is idempotent per service domain, so a reload that hands back
//! the same sets again leaves exactly one handler per service.

use std::fmt;
use std::sync::Arc;

use mockhub_domain::error::MockHubError;
use mockhub_domain::kind::DeviceKind;
use mockhub_domain::service::{ServiceCall, ServiceDomain};

use super::device::Device;
use super::restore::RestoreStateStore;

/// Runs one service against one resolved target.
pub type ServiceHandler =
    Arc<dyn Fn(&mut dyn Device, &ServiceCall) -> Result<(), MockHubError> + Send + Sync>;

/// A device integration (e.g. the virtual one).
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"virtual"`).
    fn name(&self) -> &'static str;

    /// Build every configured device.
    ///
    /// A device whose configuration is unusable ends up in
    /// [`SetupOutcome::failures`]; the others are still created.
    fn setup(&mut self, restore: &dyn RestoreStateStore) -> SetupOutcome;

    /// Handler sets for every service domain this integration answers to.
    fn services(&self) -> Vec<ServiceSet>;
}

/// Devices built by [`Integration::setup`] plus the records that failed.
#[derive(Default)]
pub struct SetupOutcome {
    pub devices: Vec<Box<dyn Device>>,
    pub failures: Vec<SetupFailure>,
}

impl fmt::Debug for SetupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupOutcome")
            .field(
                "devices",
                &self.devices.iter().map(|d| d.entity_id().to_string()).collect::<Vec<_>>(),
            )
            .field("failures", &self.failures)
            .finish()
    }
}

/// A device that could not be created, and why.
#[derive(Debug)]
pub struct SetupFailure {
    /// Position of the record in the integration's configuration, when known.
    pub index: Option<usize>,
    pub name: Option<String>,
    pub error: MockHubError,
}

/// Named handlers installed together under one service domain.
#[derive(Clone)]
pub struct ServiceSet {
    pub domain: ServiceDomain,
    pub handlers: Vec<(&'static str, ServiceHandler)>,
}

impl ServiceSet {
    #[must_use]
    pub fn new(domain: ServiceDomain) -> Self {
        Self {
            domain,
            handlers: Vec::new(),
        }
    }

    /// Services that forward straight to [`Device::apply`] on a `kind` device.
    #[must_use]
    pub fn forwarding(kind: DeviceKind, services: &[&'static str]) -> Self {
        services.iter().fold(Self::new(kind.into()), |set, &service| {
            set.with(service, Arc::new(forward_to_device))
        })
    }

    #[must_use]
    pub fn with(mut self, service: &'static str, handler: ServiceHandler) -> Self {
        self.handlers.push((service, handler));
        self
    }
}

impl fmt::Debug for ServiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSet")
            .field("domain", &self.domain)
            .field(
                "services",
                &self.handlers.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn forward_to_device(device: &mut dyn Device, call: &ServiceCall) -> Result<(), MockHubError> {
    device.apply(&call.service, &call.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockhub_domain::service::{TOGGLE, TURN_OFF, TURN_ON};

    #[test]
    fn should_build_forwarding_set_for_kind() {
        let set = ServiceSet::forwarding(DeviceKind::Switch, &[TURN_ON, TURN_OFF, TOGGLE]);
        assert_eq!(set.domain, ServiceDomain::Kind(DeviceKind::Switch));
        let names: Vec<_> = set.handlers.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec![TURN_ON, TURN_OFF, TOGGLE]);
    }

    #[test]
    fn should_list_service_names_in_debug_output() {
        let set = ServiceSet::forwarding(DeviceKind::Lock, &["lock"]);
        assert!(format!("{set:?}").contains("\"lock\""));
    }
}
