use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::SharedState;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Movie Detectives Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::quiz::start_quiz,
        crate::routes::quiz::finish_quiz,
        crate::routes::limits::get_limits,
        crate::routes::limits::reset_limits,
        crate::routes::sessions::list_sessions,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::quiz::StartQuizRequest,
            crate::dto::quiz::StartQuizResponse,
            crate::dto::quiz::FinishQuizRequest,
            crate::dto::quiz::FinishQuizResponse,
            crate::dto::quiz::VisibleQuizData,
            crate::dto::limits::LimitsResponse,
            crate::dto::limits::ResetLimitsResponse,
            crate::dto::session::SessionListItem,
            crate::quiz::QuizVariant,
            crate::quiz::Personality,
            crate::quiz::PlayerAnswer,
            crate::quiz::QuizOutcome,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quiz", description = "Quiz round lifecycle"),
        (name = "limits", description = "Daily play limits"),
        (name = "sessions", description = "Active round inspection"),
    )
)]
pub struct ApiDoc;

/// Serve the Swagger UI backed by the generated OpenAPI document.
pub fn router(state: SharedState) -> Router<SharedState> {
    let ui: Router<SharedState> = SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into();

    ui.with_state(state)
}
