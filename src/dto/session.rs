//! DTOs for the active-session listing.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::format_system_time, quiz::QuizVariant, state::QuizSession};

/// Minimal projection of an in-flight quiz round.
///
/// Deliberately excludes the payload: listing sessions must not leak answers.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionListItem {
    /// Round identifier.
    pub quiz_id: Uuid,
    /// The variant being played.
    pub quiz_type: QuizVariant,
    /// When the round was started, RFC 3339.
    pub started_at: String,
}

impl From<&QuizSession> for SessionListItem {
    fn from(session: &QuizSession) -> Self {
        Self {
            quiz_id: session.id,
            quiz_type: session.variant,
            started_at: format_system_time(session.started_at),
        }
    }
}
