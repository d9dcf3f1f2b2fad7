//! # tambak-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for the control surface
//!   (`/api/aerators`, `/api/mode`, `/api/sensors`, …)
//! - Push every committed aerator state to viewers over **server-sent
//!   events** (`/api/events`), starting with the current state
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `tambak-app` (for port traits and services) and `tambak-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
