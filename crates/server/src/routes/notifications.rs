use axum::extract::State;
use axum::Json;
use geopush_core::LocalNotification;

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Local notifications shown, oldest first", body = Vec<LocalNotification>)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<LocalNotification>> {
    Json(
        state
            .notifier
            .as_ref()
            .map(|n| n.history())
            .unwrap_or_default(),
    )
}
