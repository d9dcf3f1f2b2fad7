//! # tambak-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AeratorStateStore` — durable aerator state
//!   - `AeratorActuator` — pushes statuses to the hardware
//!   - `StatePublisher` — fan-out of committed states
//!   - `SensorReadingSource` / `SensorReadingSink` — probe readings
//! - Define **driving/inbound ports** as use-case structs/traits:
//!   - `AeratorController` — toggle, toggle all, switch mode, evaluate policy
//!   - `AutoPolicyRunner` — periodic policy evaluation
//!   - `SensorService` — latest, history, record
//!   - `ControlSurface` — optimistic client-side command protocol
//! - Provide **in-process infrastructure** (broadcast hub) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `tambak-domain` only (plus `tokio` for sync, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod broadcast_hub;
pub mod control_surface;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
