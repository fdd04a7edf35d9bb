//! RAII guard for the Idle → Running → Idle lifecycle of a run.
//!
//! The state returns to `Idle` when the guard is dropped, including when the
//! run future is cancelled part-way. A guard dropped before
//! [`RunGuard::mark_completed`] emits an error event.

use std::sync::Mutex;

use events::{Event, EventBus};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::state_machine::{RunState, RunStateMachine};

pub struct RunGuard<'a> {
    run_id: Uuid,
    state: &'a Mutex<RunState>,
    event_bus: Option<&'a EventBus>,
    completed: bool,
}

impl<'a> RunGuard<'a> {
    pub fn enter(run_id: Uuid, state: &'a Mutex<RunState>, event_bus: Option<&'a EventBus>) -> Self {
        transition(state, RunState::Running);
        debug!(run_id = %run_id, "Run guard entered");
        Self {
            run_id,
            state,
            event_bus,
            completed: false,
        }
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            warn!(run_id = %self.run_id, "Run ended before reaching the summary step");
            if let Some(bus) = self.event_bus {
                bus.emit(Event::Error {
                    message: "workflow run aborted".to_string(),
                    context: Some(self.run_id.to_string()),
                });
            }
        }
        transition(self.state, RunState::Idle);
    }
}

fn transition(state: &Mutex<RunState>, to: RunState) {
    let mut current = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(e) = RunStateMachine::validate_transition(*current, to) {
        // Runs are serialized by the run lock; reaching this is a bug.
        error!(error = %e, "Unexpected run state transition");
    }
    *current = to;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_idle() {
        let state = Mutex::new(RunState::Idle);
        {
            let mut guard = RunGuard::enter(Uuid::new_v4(), &state, None);
            assert_eq!(*state.lock().unwrap(), RunState::Running);
            guard.mark_completed();
        }
        assert_eq!(*state.lock().unwrap(), RunState::Idle);
    }

    #[test]
    fn test_abandoned_guard_emits_error() {
        let state = Mutex::new(RunState::Idle);
        let bus = EventBus::new();
        {
            let _guard = RunGuard::enter(Uuid::new_v4(), &state, Some(&bus));
        }
        assert_eq!(*state.lock().unwrap(), RunState::Idle);
        assert_eq!(bus.recent()[0].event.event_type(), "error");
    }
}
