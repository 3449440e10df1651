//! Title Detectives: guess the movie behind a generated riddle.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    clients::{Conversation, MovieProvider, MovieQuery, SpeechSynthesizer},
    error::QuizError,
    quiz::{
        FreeTextVerdict, Personality, PlayerAnswer, Quiz, QuizOutcome, QuizPayload, QuizVariant,
        RiddleQuestion, TitleDetectivesData, TitleDetectivesResult, payload_mismatch, prompts,
    },
};

use super::generate::RetryingGenerator;

/// Selection thresholds for the movie to riddle about.
const MOVIE_QUERY: MovieQuery = MovieQuery {
    page_min: 1,
    page_max: 100,
    vote_avg_min: 4.0,
    vote_count_min: 800,
};

/// Riddle-style movie guessing quiz.
pub struct TitleDetectives {
    movies: Arc<dyn MovieProvider>,
    generator: RetryingGenerator,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl TitleDetectives {
    /// Assemble the variant from its collaborators.
    pub fn new(
        movies: Arc<dyn MovieProvider>,
        generator: RetryingGenerator,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            movies,
            generator,
            speech,
        }
    }
}

impl Quiz for TitleDetectives {
    fn begin<'a>(
        &'a self,
        personality: Personality,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizPayload, QuizError>> {
        Box::pin(async move {
            let Some(movie) = self.movies.random_movie(MOVIE_QUERY).await? else {
                return Err(QuizError::ContentUnavailable(
                    "no movie found with the given criteria".into(),
                ));
            };
            debug!(movie = %movie.title, "picked riddle movie");

            let prompt = prompts::title_detectives_question(&movie, personality);
            let question: RiddleQuestion = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&question.question).await?;

            Ok(QuizPayload::TitleDetectives(TitleDetectivesData {
                question,
                movie,
                speech,
            }))
        })
    }

    fn complete<'a>(
        &'a self,
        answer: &'a PlayerAnswer,
        payload: QuizPayload,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizOutcome, QuizError>> {
        Box::pin(async move {
            let text = answer.as_text()?.to_owned();
            let QuizPayload::TitleDetectives(data) = payload else {
                return Err(payload_mismatch(QuizVariant::TitleDetectives, &payload));
            };

            let prompt = prompts::title_detectives_answer(&text);
            let verdict: FreeTextVerdict = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&verdict.answer).await?;

            Ok(QuizOutcome::TitleDetectives(TitleDetectivesResult {
                question: data.question,
                movie: data.movie,
                user_answer: text,
                result: verdict,
                speech,
            }))
        })
    }
}
