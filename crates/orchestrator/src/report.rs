use chrono::{DateTime, Utc};
use geopush_core::{Coordinates, SessionCounters, TokenError, WorkflowSummary};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Everything one workflow run did.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `None` when the run fell back to sentinel coordinates.
    pub location: Option<Coordinates>,
    pub location_error: Option<String>,
    pub store_ok: bool,
    pub document_id: Option<String>,
    pub store_error: Option<String>,
    pub relay_ok: bool,
    pub relay_status: Option<u16>,
    pub relay_error: Option<String>,
    pub summary: WorkflowSummary,
    pub summary_text: String,
    pub summary_shown: bool,
}

#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    Completed(Box<RunReport>),
    /// Dropped because another run was in flight.
    Ignored,
}

impl TriggerOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Ignored => None,
        }
    }
}

/// Result of the one-shot push registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupReport {
    Registered { token: String },
    /// Surface this to the user; the relay step will fail on every run.
    Failed { error: TokenError },
}

impl StartupReport {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    /// Title and message for an alert-style notice, if one is needed.
    pub fn alert(&self) -> Option<(&'static str, String)> {
        match self {
            Self::Registered { .. } => None,
            Self::Failed { error } => Some(("Push Error", error.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrchestratorStatus {
    pub token: Option<String>,
    pub startup_error: Option<String>,
    pub run_state: crate::state_machine::RunState,
    pub pending_triggers: usize,
    pub counters: SessionCounters,
    pub last_report: Option<RunReport>,
}
