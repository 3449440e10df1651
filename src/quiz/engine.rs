//! Orchestration of quiz rounds: quota gate, variant dispatch, session
//! lifecycle, and score recording.

use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    clients::{Conversation, ProfileStore},
    error::QuizError,
    quiz::{
        Personality, PlayerAnswer, Quiz, QuizOutcome, QuizPayload, QuizVariant,
        bttf_trivia::BttfTrivia, sequel_salad::SequelSalad, title_detectives::TitleDetectives,
        trivia::Trivia,
    },
    state::{QuizSession, SessionStore, UsageLimiter},
};

/// The quiz orchestrator.
///
/// Owns the closed dispatch table from variant tags to implementations and
/// drives the session lifecycle: a round is created by [`QuizEngine::begin`],
/// read-only while awaiting its answer, and consumed exactly once by
/// [`QuizEngine::complete`].
pub struct QuizEngine {
    sessions: Arc<SessionStore>,
    limiter: Arc<UsageLimiter>,
    profiles: Arc<dyn ProfileStore>,
    title_detectives: TitleDetectives,
    sequel_salad: SequelSalad,
    bttf_trivia: BttfTrivia,
    trivia: Trivia,
}

impl QuizEngine {
    /// Wire the engine from its shared resources and the four variant
    /// implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<SessionStore>,
        limiter: Arc<UsageLimiter>,
        profiles: Arc<dyn ProfileStore>,
        title_detectives: TitleDetectives,
        sequel_salad: SequelSalad,
        bttf_trivia: BttfTrivia,
        trivia: Trivia,
    ) -> Self {
        Self {
            sessions,
            limiter,
            profiles,
            title_detectives,
            sequel_salad,
            bttf_trivia,
            trivia,
        }
    }

    /// Static mapping from variant tag to implementation.
    fn variant_impl(&self, variant: QuizVariant) -> &dyn Quiz {
        match variant {
            QuizVariant::TitleDetectives => &self.title_detectives,
            QuizVariant::SequelSalad => &self.sequel_salad,
            QuizVariant::BttfTrivia => &self.bttf_trivia,
            QuizVariant::Trivia => &self.trivia,
        }
    }

    /// Start a fresh round of `variant`.
    ///
    /// The usage limiter is consulted first: a quota rejection leaves no
    /// session behind and makes no generator call. This deliberately means a
    /// later "no content available" failure has already burned a quota slot.
    pub async fn begin(
        &self,
        variant: QuizVariant,
        personality: Personality,
    ) -> Result<(Uuid, QuizPayload), QuizError> {
        let usage = self.limiter.check_and_increment(variant)?;
        debug!(%variant, usage, "usage slot consumed");

        let mut conversation = Conversation::new();
        let payload = self
            .variant_impl(variant)
            .begin(personality, &mut conversation)
            .await?;

        let quiz_id = Uuid::new_v4();
        self.sessions.put(QuizSession {
            id: quiz_id,
            variant,
            payload: payload.clone(),
            conversation,
            started_at: SystemTime::now(),
        });

        info!(%quiz_id, %variant, "quiz started");
        Ok((quiz_id, payload))
    }

    /// Evaluate the answer for a stored round.
    ///
    /// The answer's shape is checked against the round's variant first; a
    /// rejected input leaves the session untouched. Once the shape is
    /// accepted the session is taken out of the store, so the player's single
    /// attempt is consumed even when the evaluation later fails; retrying
    /// with the same id yields "session not found".
    pub async fn complete(
        &self,
        quiz_id: Uuid,
        answer: &PlayerAnswer,
        user_id: Option<&str>,
    ) -> Result<QuizOutcome, QuizError> {
        let stored = self
            .sessions
            .get(quiz_id)
            .ok_or_else(|| QuizError::SessionNotFound(format!("quiz `{quiz_id}` not found")))?;
        match stored.variant {
            QuizVariant::TitleDetectives | QuizVariant::SequelSalad => {
                answer.as_text()?;
            }
            QuizVariant::BttfTrivia | QuizVariant::Trivia => {
                answer.as_choice()?;
            }
        }

        let mut session = self
            .sessions
            .take(quiz_id)
            .ok_or_else(|| QuizError::SessionNotFound(format!("quiz `{quiz_id}` not found")))?;

        let variant = session.variant;
        let outcome = self
            .variant_impl(variant)
            .complete(answer, session.payload, &mut session.conversation)
            .await?;

        // Fire-and-forget: recording a score must never fail or delay the
        // player's response.
        if let Some(user_id) = user_id {
            let profiles = self.profiles.clone();
            let user = user_id.to_owned();
            let points = outcome.points();
            tokio::spawn(async move {
                if let Err(err) = profiles.record_game(&user, variant, points).await {
                    error!(%variant, user, error = %err, "failed to record game result");
                }
            });
        }

        info!(%quiz_id, %variant, points = outcome.points(), "quiz completed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use indexmap::IndexMap;

    use super::*;
    use crate::quiz::generate::RetryingGenerator;
    use crate::quiz::testing::{
        FlakyImages, RecordingProfiles, ScriptedChat, StaticFacts, StaticMovies, StaticSpeech,
        movie,
    };

    const CHOICE_JSON: &str = "{\"question\": \"q\", \"option_1\": \"a\", \"option_2\": \"b\", \
         \"option_3\": \"c\", \"option_4\": \"d\", \"correct_answer\": 4}";

    struct Fixture {
        engine: QuizEngine,
        sessions: Arc<SessionStore>,
        limiter: Arc<UsageLimiter>,
        chat: Arc<ScriptedChat>,
        profiles: Arc<RecordingProfiles>,
    }

    fn fixture(replies: &[&str], limit: u32) -> Fixture {
        let chat = Arc::new(ScriptedChat::replies(replies));
        let generator = RetryingGenerator::new(chat.clone(), 3, Duration::ZERO);
        let speech: Arc<StaticSpeech> = Arc::new(StaticSpeech);
        let facts = Arc::new(StaticFacts::new(Some("facts".into()), None));

        let sessions = Arc::new(SessionStore::new(100, Duration::from_secs(600)));
        let limits: IndexMap<_, _> = QuizVariant::ALL
            .into_iter()
            .map(|variant| (variant, limit))
            .collect();
        let limiter = Arc::new(UsageLimiter::new(limits));
        let profiles = Arc::new(RecordingProfiles::default());

        let engine = QuizEngine::new(
            sessions.clone(),
            limiter.clone(),
            profiles.clone(),
            TitleDetectives::new(
                Arc::new(StaticMovies::some(movie("Alien"))),
                generator.clone(),
                speech.clone(),
            ),
            SequelSalad::new(
                vec!["A".into(), "B".into()],
                generator.clone(),
                Arc::new(FlakyImages::failing(0)),
                speech.clone(),
            ),
            BttfTrivia::new(facts.clone(), generator.clone(), speech.clone()),
            Trivia::new(facts, generator, speech),
        );

        Fixture {
            engine,
            sessions,
            limiter,
            chat,
            profiles,
        }
    }

    #[tokio::test]
    async fn begin_stores_a_matching_session() {
        let fx = fixture(&[CHOICE_JSON], 10);

        let (quiz_id, payload) = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();

        assert_eq!(payload.variant(), QuizVariant::BttfTrivia);
        let stored = fx.sessions.get(quiz_id).expect("session stored");
        assert_eq!(stored.variant, QuizVariant::BttfTrivia);
        assert_eq!(fx.limiter.usage_snapshot()[&QuizVariant::BttfTrivia], 1);
    }

    #[tokio::test]
    async fn quota_rejection_creates_no_session_and_calls_no_generator() {
        let fx = fixture(&[CHOICE_JSON], 1);

        fx.engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();
        let result = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await;

        assert!(matches!(result, Err(QuizError::QuotaExceeded { .. })));
        assert_eq!(fx.sessions.list_active().len(), 1);
        assert_eq!(fx.chat.calls(), 1);
    }

    #[tokio::test]
    async fn complete_consumes_the_session_exactly_once() {
        let fx = fixture(&[CHOICE_JSON, "{\"answer\": \"Right!\"}"], 10);

        let (quiz_id, _) = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();
        let outcome = fx
            .engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), None)
            .await
            .unwrap();
        assert_eq!(outcome.points(), 3);

        let second = fx
            .engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), None)
            .await;
        assert!(matches!(second, Err(QuizError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn rejected_answer_shape_does_not_consume_the_attempt() {
        let fx = fixture(&[CHOICE_JSON, "{\"answer\": \"Right!\"}"], 10);

        let (quiz_id, _) = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();
        let rejected = fx
            .engine
            .complete(quiz_id, &PlayerAnswer::Choice(7), None)
            .await;
        assert!(matches!(rejected, Err(QuizError::Validation(_))));

        // The round is still answerable after the bad input.
        let outcome = fx
            .engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), None)
            .await
            .unwrap();
        assert_eq!(outcome.points(), 3);
    }

    #[tokio::test]
    async fn failed_evaluation_still_burns_the_attempt() {
        // Three malformed feedback replies exhaust the retry budget.
        let fx = fixture(&[CHOICE_JSON, "nope", "nope", "nope"], 10);

        let (quiz_id, _) = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();
        let result = fx
            .engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), None)
            .await;
        assert!(matches!(result, Err(QuizError::MalformedOutput(_))));

        let retry = fx
            .engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), None)
            .await;
        assert!(matches!(retry, Err(QuizError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn authenticated_completion_records_the_score() {
        let fx = fixture(&[CHOICE_JSON, "{\"answer\": \"Right!\"}"], 10);

        let (quiz_id, _) = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();
        fx.engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), Some("user-1"))
            .await
            .unwrap();

        // Recording happens on a spawned task; give it a chance to run.
        while fx.profiles.records().is_empty() {
            tokio::task::yield_now().await;
        }
        let records = fx.profiles.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], ("user-1".into(), QuizVariant::BttfTrivia, 3));
    }

    #[tokio::test]
    async fn anonymous_completion_records_nothing() {
        let fx = fixture(&[CHOICE_JSON, "{\"answer\": \"Right!\"}"], 10);

        let (quiz_id, _) = fx
            .engine
            .begin(QuizVariant::BttfTrivia, Personality::Default)
            .await
            .unwrap();
        fx.engine
            .complete(quiz_id, &PlayerAnswer::Choice(4), None)
            .await
            .unwrap();

        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert!(fx.profiles.records().is_empty());
    }
}
