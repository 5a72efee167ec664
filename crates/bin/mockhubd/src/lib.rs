//! # mockhubd: mockhub daemon
//!
//! Composition root that wires the virtual integration into a platform and
//! serves it over a JSON-lines session on stdin/stdout.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Build the event bus and the platform, load the virtual devices
//! - Translate request lines into platform calls and back
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

pub mod config;
pub mod session;
