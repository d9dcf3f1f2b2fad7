//! # tambak-adapter-virtual
//!
//! Simulated aerator hardware for development and demonstration.
//!
//! | Device | Behaviour |
//! |--------|-----------|
//! | [`VirtualAeratorBank`] | Eight relays; every command waits a fixed latency before acknowledging |
//!
//! The bank can be taken offline to exercise the actuator failure path.
//!
//! ## Dependency rule
//!
//! Depends on `tambak-app` (port traits) and `tambak-domain` only.

mod bank;
mod error;

pub use bank::VirtualAeratorBank;
pub use error::VirtualActuatorError;
