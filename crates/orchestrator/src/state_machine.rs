use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{OrchestratorError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct RunStateMachine;

impl RunStateMachine {
    pub fn validate_transition(from: RunState, to: RunState) -> Result<()> {
        match (from, to) {
            (RunState::Idle, RunState::Running) | (RunState::Running, RunState::Idle) => Ok(()),
            (RunState::Running, RunState::Running) => Err(OrchestratorError::AlreadyRunning),
            _ => Err(OrchestratorError::InvalidTransition { from, to }),
        }
    }

    pub fn can_transition(from: RunState, to: RunState) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(RunStateMachine::can_transition(RunState::Idle, RunState::Running));
        assert!(RunStateMachine::can_transition(RunState::Running, RunState::Idle));
    }

    #[test]
    fn test_reentry_is_rejected() {
        assert!(matches!(
            RunStateMachine::validate_transition(RunState::Running, RunState::Running),
            Err(OrchestratorError::AlreadyRunning)
        ));
        assert!(!RunStateMachine::can_transition(RunState::Idle, RunState::Idle));
    }
}
