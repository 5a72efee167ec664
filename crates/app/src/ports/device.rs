//! Device port: the operation set every simulated device implements.

use mockhub_domain::entity::{Entity, EntityState};
use mockhub_domain::error::MockHubError;
use mockhub_domain::id::EntityId;
use mockhub_domain::kind::DeviceKind;

/// A simulated device owned by the [`EntityRegistry`](crate::services::entity_registry::EntityRegistry).
///
/// Capabilities are fixed at construction. State only changes through
/// [`apply`](Self::apply) and [`set_available`](Self::set_available).
pub trait Device: Send {
    fn entity_id(&self) -> &EntityId;

    /// Display name the identifier was derived from.
    fn name(&self) -> &str;

    fn kind(&self) -> DeviceKind {
        self.entity_id().kind()
    }

    fn is_available(&self) -> bool;

    /// Mark the device reachable or not. Always succeeds.
    fn set_available(&mut self, available: bool);

    /// The state the device holds, whether or not it is reachable.
    ///
    /// [`snapshot`](Self::snapshot) masks it as `unavailable` while the
    /// device is unreachable; this does not.
    fn state(&self) -> EntityState;

    /// Read-only view of the current state. No side effects.
    fn snapshot(&self) -> Entity;

    /// Run the named transition with its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MockHubError::Rejected`] when the device refuses the command
    /// (state is left unchanged) and [`MockHubError::Validation`] when `data`
    /// cannot be read as the command's parameters.
    fn apply(&mut self, service: &str, data: &serde_json::Value) -> Result<(), MockHubError>;
}
