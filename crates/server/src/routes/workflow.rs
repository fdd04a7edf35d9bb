use axum::extract::State;
use axum::Json;
use orchestrator::{OrchestratorError, OrchestratorStatus, RunReport, TriggerOutcome};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Token, run state and session counters", body = OrchestratorStatus)
    ),
    tag = "workflow"
)]
pub async fn get_status(State(state): State<AppState>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator.status())
}

#[utoipa::path(
    post,
    path = "/api/workflow/run",
    responses(
        (status = 200, description = "Run finished; failures are reported in the body", body = RunReport),
        (status = 409, description = "Ignored because a run is already in progress"),
        (status = 500, description = "The run task did not finish")
    ),
    tag = "workflow"
)]
pub async fn run_workflow(State(state): State<AppState>) -> Result<Json<RunReport>, AppError> {
    info!("Workflow triggered over HTTP");

    match state.orchestrator.clone().trigger_detached().await? {
        TriggerOutcome::Completed(report) => Ok(Json(*report)),
        TriggerOutcome::Ignored => Err(OrchestratorError::AlreadyRunning.into()),
    }
}
