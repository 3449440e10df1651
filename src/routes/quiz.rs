//! Routes that start quiz rounds and evaluate their answers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, header::AUTHORIZATION},
    routing::post,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::quiz::{
        FinishQuizRequest, FinishQuizResponse, StartQuizRequest, StartQuizResponse,
        VisibleQuizData,
    },
    error::AppError,
    quiz::QuizVariant,
    state::SharedState,
};

/// Routes handling the quiz round lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quiz/{quiz_type}", post(start_quiz))
        .route("/quiz/{quiz_id}/answer", post(finish_quiz))
}

/// Start a fresh round of the requested variant.
#[utoipa::path(
    post,
    path = "/quiz/{quiz_type}",
    tag = "quiz",
    params(("quiz_type" = QuizVariant, Path, description = "Variant to play")),
    request_body = StartQuizRequest,
    responses(
        (status = 200, description = "Round started", body = StartQuizResponse),
        (status = 429, description = "Daily play limit reached for this variant")
    )
)]
pub async fn start_quiz(
    State(state): State<SharedState>,
    Path(quiz_type): Path<QuizVariant>,
    Valid(Json(payload)): Valid<Json<StartQuizRequest>>,
) -> Result<Json<StartQuizResponse>, AppError> {
    if payload.quiz_type != quiz_type {
        return Err(AppError::BadRequest(format!(
            "body quiz_type `{}` does not match path `{quiz_type}`",
            payload.quiz_type
        )));
    }

    let (quiz_id, quiz_payload) = state.engine().begin(quiz_type, payload.personality).await?;

    Ok(Json(StartQuizResponse {
        quiz_id,
        quiz_type,
        quiz_data: VisibleQuizData::from(&quiz_payload),
    }))
}

/// Submit the answer for a running round and receive the scored outcome.
#[utoipa::path(
    post,
    path = "/quiz/{quiz_id}/answer",
    tag = "quiz",
    params(("quiz_id" = Uuid, Path, description = "Round to answer")),
    request_body = FinishQuizRequest,
    responses(
        (status = 200, description = "Answer evaluated", body = FinishQuizResponse),
        (status = 404, description = "Unknown, expired, or already answered round")
    )
)]
pub async fn finish_quiz(
    State(state): State<SharedState>,
    Path(quiz_id): Path<Uuid>,
    headers: HeaderMap,
    Valid(Json(payload)): Valid<Json<FinishQuizRequest>>,
) -> Result<Json<FinishQuizResponse>, AppError> {
    if payload.quiz_id != quiz_id {
        return Err(AppError::BadRequest(format!(
            "body quiz_id `{}` does not match path `{quiz_id}`",
            payload.quiz_id
        )));
    }

    let user_id = resolve_identity(&state, &headers).await;

    let outcome = state
        .engine()
        .complete(quiz_id, &payload.answer, user_id.as_deref())
        .await?;

    Ok(Json(FinishQuizResponse {
        quiz_id,
        quiz_type: outcome.variant(),
        quiz_result: outcome,
    }))
}

/// Resolve the optional `Authorization` bearer token to a user id.
///
/// Unauthenticated and unresolvable callers play anonymously.
async fn resolve_identity(state: &SharedState, headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    state.identity().resolve(token).await
}
