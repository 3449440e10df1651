//! DTOs for starting and finishing quiz rounds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    clients::MovieDetails,
    quiz::{
        ChoiceQuestion, Personality, PlayerAnswer, QuizOutcome, QuizPayload, QuizVariant,
        RiddleQuestion, SequelQuestion,
    },
};

/// Longest accepted free-text answer.
const MAX_ANSWER_CHARS: usize = 300;

/// Body of `POST /quiz/{quiz_type}`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartQuizRequest {
    /// The variant to play; must agree with the path.
    pub quiz_type: QuizVariant,
    /// Persona the quiz master adopts for this round.
    #[serde(default)]
    pub personality: Personality,
}

/// The part of a round's payload the player is allowed to see.
///
/// Guessing variants keep their solution (the movie or franchise) server-side;
/// the multiple-choice variants expose the full generated question.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum VisibleQuizData {
    /// TitleDetectives: the riddle and its narration.
    Riddle {
        /// The generated riddle.
        question: RiddleQuestion,
        /// Audio reference for the spoken question.
        speech: String,
    },
    /// SequelSalad: the invented pitch, its poster, and its narration.
    SequelPitch {
        /// The generated sequel pitch.
        question: SequelQuestion,
        /// Poster reference, if image generation succeeded.
        poster: Option<String>,
        /// Audio reference for the spoken pitch.
        speech: String,
    },
    /// BttfTrivia: the full multiple-choice question and its narration.
    Choice {
        /// The generated multiple-choice question.
        question: ChoiceQuestion,
        /// Audio reference for the spoken question.
        speech: String,
    },
    /// Trivia: the full multiple-choice question, its movie, and narration.
    MovieChoice {
        /// The generated multiple-choice question.
        question: ChoiceQuestion,
        /// The movie the question is about.
        movie: MovieDetails,
        /// Audio reference for the spoken question.
        speech: String,
    },
}

impl From<&QuizPayload> for VisibleQuizData {
    fn from(payload: &QuizPayload) -> Self {
        match payload {
            QuizPayload::TitleDetectives(data) => VisibleQuizData::Riddle {
                question: data.question.clone(),
                speech: data.speech.clone(),
            },
            QuizPayload::SequelSalad(data) => VisibleQuizData::SequelPitch {
                question: data.question.clone(),
                poster: data.poster.clone(),
                speech: data.speech.clone(),
            },
            QuizPayload::BttfTrivia(data) => VisibleQuizData::Choice {
                question: data.question.clone(),
                speech: data.speech.clone(),
            },
            QuizPayload::Trivia(data) => VisibleQuizData::MovieChoice {
                question: data.question.clone(),
                movie: data.movie.clone(),
                speech: data.speech.clone(),
            },
        }
    }
}

/// Response of `POST /quiz/{quiz_type}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartQuizResponse {
    /// Identifier to submit the answer against.
    pub quiz_id: Uuid,
    /// The variant that was started.
    pub quiz_type: QuizVariant,
    /// Player-visible round data.
    pub quiz_data: VisibleQuizData,
}

/// Body of `POST /quiz/{quiz_id}/answer`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FinishQuizRequest {
    /// The round being answered; must agree with the path.
    pub quiz_id: Uuid,
    /// The player's answer: free text or a 1-based option index.
    #[validate(custom(function = "validate_answer"))]
    pub answer: PlayerAnswer,
}

/// Response of `POST /quiz/{quiz_id}/answer`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinishQuizResponse {
    /// The round that was answered.
    pub quiz_id: Uuid,
    /// The variant that was played.
    pub quiz_type: QuizVariant,
    /// Scored outcome including the solution.
    pub quiz_result: QuizOutcome,
}

fn validate_answer(answer: &PlayerAnswer) -> Result<(), ValidationError> {
    if let PlayerAnswer::Text(text) = answer {
        if text.trim().is_empty() {
            let mut err = ValidationError::new("answer_empty");
            err.message = Some("Answer must not be empty".into());
            return Err(err);
        }
        if text.chars().count() > MAX_ANSWER_CHARS {
            let mut err = ValidationError::new("answer_too_long");
            err.message =
                Some(format!("Answer must be at most {MAX_ANSWER_CHARS} characters").into());
            return Err(err);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::quiz::{SequelSaladData, TitleDetectivesData};

    fn riddle_payload() -> QuizPayload {
        QuizPayload::TitleDetectives(TitleDetectivesData {
            question: RiddleQuestion {
                question: "A shark terrorizes a beach town.".into(),
                hint1: "1975".into(),
                hint2: "J...".into(),
            },
            movie: crate::quiz::testing::movie("Jaws"),
            speech: "/audio/q.mp3".into(),
        })
    }

    #[test]
    fn riddle_data_never_exposes_the_movie() {
        let visible = VisibleQuizData::from(&riddle_payload());
        let value = serde_json::to_value(&visible).unwrap();

        assert!(value.get("movie").is_none());
        assert_eq!(
            value["question"]["hint1"],
            json!("1975"),
            "question survives: {value}"
        );
    }

    #[test]
    fn sequel_data_never_exposes_the_franchise() {
        let payload = QuizPayload::SequelSalad(SequelSaladData {
            question: SequelQuestion {
                sequel_plot: "plot".into(),
                sequel_title: "title".into(),
                poster_prompt: "prompt".into(),
            },
            franchise: "Alien".into(),
            poster: Some("/images/p.png".into()),
            speech: "/audio/q.mp3".into(),
        });

        let value = serde_json::to_value(VisibleQuizData::from(&payload)).unwrap();
        assert!(value.get("franchise").is_none());
        assert_eq!(value["poster"], json!("/images/p.png"));
    }

    #[test]
    fn finish_request_rejects_blank_and_oversized_answers() {
        let quiz_id = Uuid::new_v4();
        let blank = FinishQuizRequest {
            quiz_id,
            answer: PlayerAnswer::Text("   ".into()),
        };
        assert!(blank.validate().is_err());

        let oversized = FinishQuizRequest {
            quiz_id,
            answer: PlayerAnswer::Text("x".repeat(MAX_ANSWER_CHARS + 1)),
        };
        assert!(oversized.validate().is_err());

        let choice = FinishQuizRequest {
            quiz_id,
            answer: PlayerAnswer::Choice(2),
        };
        assert!(choice.validate().is_ok());
    }

    #[test]
    fn start_request_personality_defaults() {
        let request: StartQuizRequest =
            serde_json::from_str("{\"quiz_type\": \"trivia\"}").unwrap();
        assert_eq!(request.quiz_type, QuizVariant::Trivia);
        assert_eq!(request.personality, Personality::Default);
    }

    #[test]
    fn request_bodies_require_their_tag_fields() {
        // Bodies without the round tag are malformed, not silently accepted.
        let start: Result<StartQuizRequest, _> = serde_json::from_str("{}");
        assert!(start.is_err());

        let finish: Result<FinishQuizRequest, _> = serde_json::from_str("{\"answer\": 2}");
        assert!(finish.is_err());
    }
}
