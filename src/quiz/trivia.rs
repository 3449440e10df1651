//! Trivia: multiple-choice questions about a randomly picked movie.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    clients::{Conversation, FactSource, SpeechSynthesizer},
    error::QuizError,
    quiz::{
        CHOICE_POINTS, ChoiceFeedback, ChoiceQuestion, Personality, PlayerAnswer, Quiz,
        QuizOutcome, QuizPayload, QuizVariant, TriviaData, TriviaResult, payload_mismatch, prompts,
    },
};

use super::generate::RetryingGenerator;

/// Per-movie multiple-choice trivia quiz.
pub struct Trivia {
    facts: Arc<dyn FactSource>,
    generator: RetryingGenerator,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl Trivia {
    /// Assemble the variant from its collaborators.
    pub fn new(
        facts: Arc<dyn FactSource>,
        generator: RetryingGenerator,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            facts,
            generator,
            speech,
        }
    }
}

impl Quiz for Trivia {
    fn begin<'a>(
        &'a self,
        personality: Personality,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizPayload, QuizError>> {
        Box::pin(async move {
            let Some(movie_facts) = self.facts.random_movie_facts().await? else {
                return Err(QuizError::ContentUnavailable(
                    "no movie with background facts found".into(),
                ));
            };
            debug!(movie = %movie_facts.movie.title, "picked trivia movie");

            let prompt =
                prompts::trivia_question(&movie_facts.movie, &movie_facts.facts, personality);
            let question: ChoiceQuestion = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&question.question).await?;

            Ok(QuizPayload::Trivia(TriviaData {
                question,
                movie: movie_facts.movie,
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
            let index = answer.as_choice()?;
            let QuizPayload::Trivia(data) = payload else {
                return Err(payload_mismatch(QuizVariant::Trivia, &payload));
            };

            let correct = index == data.question.correct_answer;
            let points = if correct { CHOICE_POINTS } else { 0 };
            let picked = data.question.option_text(index).unwrap_or_default();

            let prompt = prompts::choice_feedback(picked, index, correct);
            let feedback: ChoiceFeedback = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&feedback.answer).await?;

            Ok(QuizOutcome::Trivia(TriviaResult {
                question: data.question,
                movie: data.movie,
                user_answer: index,
                result: feedback,
                points,
                speech,
            }))
        })
    }
}
