//! DTOs for the daily play-limit endpoints.

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::quiz::QuizVariant;

/// Response of `GET /limits`: configured ceilings and today's committed usage.
#[derive(Debug, Serialize, ToSchema)]
pub struct LimitsResponse {
    /// Configured per-variant daily ceilings.
    pub daily_limits: IndexMap<QuizVariant, u32>,
    /// Plays started today, per variant.
    pub usage: IndexMap<QuizVariant, u32>,
    /// The UTC day the usage counters belong to, RFC 3339 date.
    pub current_date: String,
}

/// Response of `POST /limits/reset`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetLimitsResponse {
    /// Acknowledgement message.
    pub message: String,
}
