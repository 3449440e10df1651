//! BTTF Trivia: multiple-choice questions about a fixed movie topic.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    clients::{Conversation, FactSource, SpeechSynthesizer},
    error::QuizError,
    quiz::{
        BttfTriviaData, BttfTriviaResult, CHOICE_POINTS, ChoiceFeedback, ChoiceQuestion,
        Personality, PlayerAnswer, Quiz, QuizOutcome, QuizPayload, QuizVariant, payload_mismatch,
        prompts,
    },
};

use super::generate::RetryingGenerator;

/// Topic whose background facts feed the questions.
const TOPIC: &str = "Back to the Future";

/// Fixed-topic multiple-choice trivia quiz.
pub struct BttfTrivia {
    facts: Arc<dyn FactSource>,
    generator: RetryingGenerator,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl BttfTrivia {
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

impl Quiz for BttfTrivia {
    fn begin<'a>(
        &'a self,
        personality: Personality,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizPayload, QuizError>> {
        Box::pin(async move {
            let Some(context) = self.facts.topic_facts(TOPIC).await? else {
                return Err(QuizError::ContentUnavailable(format!(
                    "no background facts found for {TOPIC}"
                )));
            };

            let prompt = prompts::bttf_trivia_question(&context, personality);
            let question: ChoiceQuestion = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&question.question).await?;

            Ok(QuizPayload::BttfTrivia(BttfTriviaData { question, speech }))
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
            let QuizPayload::BttfTrivia(data) = payload else {
                return Err(payload_mismatch(QuizVariant::BttfTrivia, &payload));
            };

            let correct = index == data.question.correct_answer;
            let points = if correct { CHOICE_POINTS } else { 0 };
            let picked = data.question.option_text(index).unwrap_or_default();

            // Feedback is generated either way so the round ends with flavor
            // text, not just a number.
            let prompt = prompts::choice_feedback(picked, index, correct);
            let feedback: ChoiceFeedback = self.generator.ask(conversation, &prompt).await?;
            let speech = self.speech.synthesize(&feedback.answer).await?;

            Ok(QuizOutcome::BttfTrivia(BttfTriviaResult {
                question: data.question,
                user_answer: index,
                result: feedback,
                points,
                speech,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::quiz::testing::{ScriptedChat, StaticFacts, StaticSpeech};

    const QUESTION_JSON: &str = "{\"question\": \"question\", \"option_1\": \"option 1\", \
         \"option_2\": \"option 2\", \"option_3\": \"option 3\", \"option_4\": \"option 4\", \
         \"correct_answer\": 4}";

    fn variant(chat: Arc<ScriptedChat>, facts: StaticFacts) -> BttfTrivia {
        BttfTrivia::new(
            Arc::new(facts),
            RetryingGenerator::new(chat, 3, Duration::ZERO),
            Arc::new(StaticSpeech),
        )
    }

    #[tokio::test]
    async fn begin_produces_four_options_and_speech() {
        let quiz = variant(
            Arc::new(ScriptedChat::replies(&[QUESTION_JSON])),
            StaticFacts::new(Some("facts".into()), None),
        );

        let mut conversation = Conversation::new();
        let payload = quiz
            .begin(Personality::Default, &mut conversation)
            .await
            .unwrap();

        let QuizPayload::BttfTrivia(data) = payload else {
            panic!("wrong payload variant");
        };
        assert_eq!(data.question.question, "question");
        assert_eq!(data.question.option_4, "option 4");
        assert_eq!(data.question.correct_answer, 4);
        assert!(!data.speech.is_empty());
    }

    #[tokio::test]
    async fn begin_without_facts_is_a_content_gap() {
        let quiz = variant(
            Arc::new(ScriptedChat::replies(&[])),
            StaticFacts::new(None, None),
        );

        let mut conversation = Conversation::new();
        let result = quiz.begin(Personality::Default, &mut conversation).await;
        assert!(matches!(result, Err(QuizError::ContentUnavailable(_))));
    }

    #[tokio::test]
    async fn correct_index_scores_fixed_points() {
        let chat = Arc::new(ScriptedChat::replies(&[
            QUESTION_JSON,
            "{\"answer\": \"Great Scott, that's right!\"}",
        ]));
        let quiz = variant(chat, StaticFacts::new(Some("facts".into()), None));

        let mut conversation = Conversation::new();
        let payload = quiz
            .begin(Personality::Default, &mut conversation)
            .await
            .unwrap();
        let outcome = quiz
            .complete(&PlayerAnswer::Choice(4), payload, &mut conversation)
            .await
            .unwrap();

        assert_eq!(outcome.points(), CHOICE_POINTS);
    }

    #[tokio::test]
    async fn wrong_index_still_gets_feedback_but_no_points() {
        let chat = Arc::new(ScriptedChat::replies(&[
            QUESTION_JSON,
            "{\"answer\": \"Not quite, it was option 4.\"}",
        ]));
        let quiz = variant(chat.clone(), StaticFacts::new(Some("facts".into()), None));

        let mut conversation = Conversation::new();
        let payload = quiz
            .begin(Personality::Default, &mut conversation)
            .await
            .unwrap();
        let outcome = quiz
            .complete(&PlayerAnswer::Choice(1), payload, &mut conversation)
            .await
            .unwrap();

        assert_eq!(outcome.points(), 0);
        let QuizOutcome::BttfTrivia(result) = outcome else {
            panic!("wrong outcome variant");
        };
        assert_eq!(result.result.answer, "Not quite, it was option 4.");
        // The feedback turn always runs, correct or not.
        assert_eq!(chat.calls(), 2);
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected_before_generation() {
        let chat = Arc::new(ScriptedChat::replies(&[QUESTION_JSON]));
        let quiz = variant(chat.clone(), StaticFacts::new(Some("facts".into()), None));

        let mut conversation = Conversation::new();
        let payload = quiz
            .begin(Personality::Default, &mut conversation)
            .await
            .unwrap();
        let result = quiz
            .complete(&PlayerAnswer::Choice(7), payload, &mut conversation)
            .await;

        assert!(matches!(result, Err(QuizError::Validation(_))));
        assert_eq!(chat.calls(), 1);
    }
}
