//! Application services: device ownership, command dispatch and loading.
//!
//! [`EntityRegistry`](entity_registry::EntityRegistry) owns the devices.
//! [`ServiceRegistry`](service_registry::ServiceRegistry) routes calls to them
//! and reports through its `EventPublisher`. [`Platform`](platform::Platform)
//! fills both from an `Integration` on every load.

pub mod entity_registry;
pub mod platform;
pub mod service_registry;
