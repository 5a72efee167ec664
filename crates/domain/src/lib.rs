//! # mockhub-domain
//!
//! Pure domain model for the mockhub device simulator.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, device kinds, error conventions, timestamps
//! - Define **Entities** (read-only snapshots of a simulated device)
//! - Define **Capabilities** (feature bitsets fixed at device creation)
//! - Define **Services** (named commands routed to one or more entities)
//! - Define **Events** (call and state-change notifications)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod kind;
pub mod time;

pub mod capability;
pub mod entity;
pub mod event;
pub mod service;
