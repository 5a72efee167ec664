//! # mockhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `Device`: the fixed operation set every simulated device answers to
//!   - `Integration`: builds devices from configuration, names its services
//!   - `EventPublisher`: notification hook run after each mutation
//!   - `RestoreStateStore`: last known states for devices that restore them
//! - Provide the **entity registry** (identifier → device lookup, by kind)
//! - Provide the **service registry** (idempotent install, per-target dispatch)
//! - Provide the **platform** use-case that wires the two together on load and reload
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `mockhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
