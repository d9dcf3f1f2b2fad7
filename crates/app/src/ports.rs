//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod actuator;
pub mod publisher;
pub mod sensor;
pub mod state_store;

pub use actuator::AeratorActuator;
pub use publisher::StatePublisher;
pub use sensor::{SensorReadingSink, SensorReadingSource};
pub use state_store::AeratorStateStore;
