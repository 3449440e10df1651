//! Route listing the in-flight quiz rounds.

use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::session::SessionListItem, state::SharedState};

/// Routes handling session inspection.
pub fn router() -> Router<SharedState> {
    Router::new().route("/sessions", get(list_sessions))
}

/// List the currently active rounds without their payloads.
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    responses((status = 200, description = "Active rounds", body = [SessionListItem]))
)]
pub async fn list_sessions(State(state): State<SharedState>) -> Json<Vec<SessionListItem>> {
    let sessions = state
        .sessions()
        .list_active()
        .iter()
        .map(SessionListItem::from)
        .collect();

    Json(sessions)
}
