//! Sequel Salad: guess the franchise behind an invented sequel pitch.

use std::sync::Arc;

use futures::future::BoxFuture;
use rand::Rng;
use tracing::{debug, warn};

use crate::{
    clients::{Conversation, ImageGenerator, SpeechSynthesizer},
    error::QuizError,
    quiz::{
        FreeTextVerdict, Personality, PlayerAnswer, Quiz, QuizOutcome, QuizPayload, QuizVariant,
        SequelQuestion, SequelSaladData, SequelSaladResult, payload_mismatch, prompts,
    },
};

use super::generate::RetryingGenerator;

/// Franchise guessing quiz built around a generated fake sequel.
pub struct SequelSalad {
    franchises: Vec<String>,
    generator: RetryingGenerator,
    images: Arc<dyn ImageGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl SequelSalad {
    /// Assemble the variant from its collaborators and the managed franchise
    /// pool.
    pub fn new(
        franchises: Vec<String>,
        generator: RetryingGenerator,
        images: Arc<dyn ImageGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            franchises,
            generator,
            images,
            speech,
        }
    }

    /// Generate the poster, falling back to a content-safe prompt when the
    /// model rejects the generated one. A missing poster is not fatal.
    async fn generate_poster(&self, poster_prompt: &str, franchise: &str) -> Option<String> {
        match self.images.generate(poster_prompt).await {
            Ok(reference) => return Some(reference),
            Err(err) => {
                warn!(error = %err, "poster generation failed; trying fallback prompt");
            }
        }

        let fallback = format!(
            "A dramatic, family-friendly movie poster for a fictional new {franchise} sequel"
        );
        match self.images.generate(&fallback).await {
            Ok(reference) => Some(reference),
            Err(err) => {
                warn!(error = %err, "fallback poster generation failed; continuing without poster");
                None
            }
        }
    }
}

impl Quiz for SequelSalad {
    fn begin<'a>(
        &'a self,
        personality: Personality,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizPayload, QuizError>> {
        Box::pin(async move {
            if self.franchises.is_empty() {
                return Err(QuizError::ContentUnavailable(
                    "no franchises configured".into(),
                ));
            }
            let franchise =
                self.franchises[rand::rng().random_range(0..self.franchises.len())].clone();
            debug!(%franchise, "picked sequel franchise");

            let prompt = prompts::sequel_salad_question(&franchise, personality);
            let question: SequelQuestion = self.generator.ask(conversation, &prompt).await?;

            let poster = self
                .generate_poster(&question.poster_prompt, &franchise)
                .await;
            let speech = self.speech.synthesize(&question.sequel_plot).await?;

            Ok(QuizPayload::SequelSalad(SequelSaladData {
                question,
                franchise,
                poster,
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
            let QuizPayload::SequelSalad(data) = payload else {
                return Err(payload_mismatch(QuizVariant::SequelSalad, &payload));
            };

            let prompt = prompts::sequel_salad_answer(&text);
            let verdict: FreeTextVerdict = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&verdict.answer).await?;

            Ok(QuizOutcome::SequelSalad(SequelSaladResult {
                question: data.question,
                franchise: data.franchise,
                user_answer: text,
                result: verdict,
                speech,
            }))
        })
    }
}
