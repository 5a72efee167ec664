//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MockHubError`] via `#[from]`.

use crate::kind::DeviceKind;

/// Umbrella error for every fallible domain and application operation.
#[derive(Debug, thiserror::Error)]
pub enum MockHubError {
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("command rejected")]
    Rejected(#[from] RejectedCommand),

    #[error("validation error")]
    Validation(#[from] ValidationError),
}

/// A device configuration record is missing something it cannot live without.
///
/// Fatal for the single device being created, never for the whole set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{platform} device is missing required field `{field}`")]
    MissingField {
        platform: DeviceKind,
        field: &'static str,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A device refused a command. Its state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectedCommand {
    #[error("invalid preset mode `{mode}`, expected one of {allowed:?}")]
    InvalidPresetMode { mode: String, allowed: Vec<String> },

    #[error("{kind} devices do not handle `{service}`")]
    UnsupportedService { kind: DeviceKind, service: String },
}

/// Input that does not satisfy a domain invariant.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("entity id `{0}` is not of the form <kind>.<object_id>")]
    InvalidEntityId(String),

    #[error("unknown device kind `{0}`")]
    UnknownKind(String),

    #[error("entity id `{0}` is already registered")]
    DuplicateEntityId(String),

    #[error("service call has no `entity_id` target")]
    MissingTargets,

    #[error("`{0}` is not a boolean value")]
    InvalidBoolean(String),

    #[error("invalid data for service `{service}`")]
    InvalidPayload {
        service: String,
        #[source]
        source: serde_json::Error,
    },
}
