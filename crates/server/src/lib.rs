pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "geopush API",
        version = "0.1.0",
        description = "Trigger the location/store/push workflow and inspect its counters"
    ),
    paths(
        routes::health_check,
        routes::get_status,
        routes::run_workflow,
        routes::list_notifications,
        routes::sse::events_stream,
    ),
    components(schemas(
        routes::HealthResponse,
        orchestrator::OrchestratorStatus,
        orchestrator::RunReport,
        orchestrator::RunState,
        geopush_core::SessionCounters,
        geopush_core::WorkflowSummary,
        geopush_core::Coordinates,
        geopush_core::LocalNotification,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "workflow", description = "Workflow trigger and status"),
        (name = "notifications", description = "Local notifications shown so far"),
        (name = "events", description = "Real-time event streaming (SSE)"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/status", get(routes::get_status))
        .route("/api/workflow/run", post(routes::run_workflow))
        .route("/api/notifications", get(routes::list_notifications))
        .route("/api/events", get(routes::sse::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
