use tambak_domain::error::TambakError;

/// Failures of the simulated hardware.
#[derive(Debug, thiserror::Error)]
pub enum VirtualActuatorError {
    #[error("virtual aerator bank is offline")]
    Offline,

    #[error("command addressed {got} aerators, bank has {expected}")]
    WrongCount { expected: usize, got: usize },
}

impl From<VirtualActuatorError> for TambakError {
    fn from(err: VirtualActuatorError) -> Self {
        Self::Actuator(Box::new(err))
    }
}
