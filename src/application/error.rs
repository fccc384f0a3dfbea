// Engine error taxonomy
use crate::domain::mode::IntentError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no board selected")]
    NoBoardSelected,
    #[error("no data for the requested range")]
    NoData,
    #[error("history store unavailable: {0}")]
    TransportFailure(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

impl EngineError {
    /// Transport failures are shown to the user exactly like an empty range.
    pub fn presents_as_no_data(&self) -> bool {
        matches!(self, EngineError::NoData | EngineError::TransportFailure(_))
    }
}

/// Failure of a user action on a channel.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Intent(#[from] IntentError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
