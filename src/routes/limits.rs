//! Routes exposing and resetting the daily play limits.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};

use crate::{
    dto::limits::{LimitsResponse, ResetLimitsResponse},
    error::AppError,
    state::{SharedState, usage::today_utc},
};

/// Header carrying the shared administrative secret.
const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Routes handling play-limit inspection and administration.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/limits", get(get_limits))
        .route("/limits/reset", post(reset_limits))
}

/// Report the configured limits and today's committed usage.
#[utoipa::path(
    get,
    path = "/limits",
    tag = "limits",
    responses((status = 200, description = "Current limits and usage", body = LimitsResponse))
)]
pub async fn get_limits(State(state): State<SharedState>) -> Json<LimitsResponse> {
    let limiter = state.limiter();

    Json(LimitsResponse {
        daily_limits: limiter.limits().clone(),
        usage: limiter.usage_snapshot(),
        current_date: today_utc().to_string(),
    })
}

/// Reset today's usage counters across all variants.
#[utoipa::path(
    post,
    path = "/limits/reset",
    tag = "limits",
    responses(
        (status = 200, description = "Usage counters reset", body = ResetLimitsResponse),
        (status = 401, description = "Missing or invalid administrative secret")
    )
)]
pub async fn reset_limits(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<ResetLimitsResponse>, AppError> {
    let expected = state
        .config()
        .admin_secret
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("administrative operations are disabled".into()))?;

    let provided = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized(format!("missing secret header `{ADMIN_SECRET_HEADER}`"))
        })?;

    if provided != expected {
        return Err(AppError::Unauthorized("invalid administrative secret".into()));
    }

    state.limiter().reset_today();
    Ok(Json(ResetLimitsResponse {
        message: "usage counters reset for today".into(),
    }))
}
