use thiserror::Error;

use crate::state_machine::RunState;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid run state transition from {from} to {to}")]
    InvalidTransition { from: RunState, to: RunState },

    #[error("A workflow run is already in progress")]
    AlreadyRunning,

    #[error("Workflow run aborted: {0}")]
    RunAborted(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
