pub mod clients;
pub mod config;
pub mod counters;
pub mod error;
pub mod report;
pub mod run_guard;
pub mod state_machine;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clients::WorkflowClients;
pub use config::{TriggerPolicy, WorkflowConfig};
pub use error::{OrchestratorError, Result};
pub use report::{OrchestratorStatus, RunReport, StartupReport, TriggerOutcome};
pub use state_machine::{RunState, RunStateMachine};
pub use workflow::Orchestrator;
