//! # tambak-domain
//!
//! Pure domain model for the tambak pond controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Aerators** (the eight on/off devices) and the shared
//!   [`AeratorSystemState`](aerator::AeratorSystemState) with its mode invariants
//! - Define the **commands** an operator can issue and their transitions
//! - Define **Sensor readings** and their three-tier classification
//! - Define the **auto-activation policy**: which readings force all aerators on
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod aerator;
pub mod command;
pub mod policy;
pub mod sensor;
