//! # tambak-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `tambak-app::ports`
//!   (`AeratorStateStore`, `SensorReadingSource`, `SensorReadingSink`)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations), which seed the
//!   eight aerators on first boot
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `tambak-app` (for port traits) and `tambak-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod aerator_store;
pub mod error;
pub mod pool;
pub mod sensor_repo;
