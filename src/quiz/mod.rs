//! Quiz domain model: variants, question/answer shapes, the tagged payload and
//! outcome unions, and the shared two-phase [`Quiz`] contract.

pub mod bttf_trivia;
pub mod engine;
pub mod generate;
pub mod prompts;
pub mod sequel_salad;
#[cfg(test)]
pub(crate) mod testing;
pub mod title_detectives;
pub mod trivia;

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    clients::{Conversation, MovieDetails},
    error::QuizError,
};

/// Points awarded for a correct multiple-choice answer.
pub const CHOICE_POINTS: u32 = 3;

/// The four quiz game types, each with its own question/answer shape and
/// scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuizVariant {
    /// Guess the movie from a riddle-style description.
    TitleDetectives,
    /// Guess the franchise behind an invented sequel pitch.
    SequelSalad,
    /// Multiple-choice trivia about a fixed movie topic.
    BttfTrivia,
    /// Multiple-choice trivia about a random movie.
    Trivia,
}

impl QuizVariant {
    /// All variants in dispatch order.
    pub const ALL: [QuizVariant; 4] = [
        QuizVariant::TitleDetectives,
        QuizVariant::SequelSalad,
        QuizVariant::BttfTrivia,
        QuizVariant::Trivia,
    ];

    /// Stable wire name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizVariant::TitleDetectives => "title-detectives",
            QuizVariant::SequelSalad => "sequel-salad",
            QuizVariant::BttfTrivia => "bttf-trivia",
            QuizVariant::Trivia => "trivia",
        }
    }
}

impl fmt::Display for QuizVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persona the generator adopts when phrasing questions and feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Neutral quiz-master persona.
    #[default]
    Default,
    /// Santa Claus persona.
    Christmas,
    /// Distracted-scientist persona.
    Scientist,
    /// Dad-joke persona.
    Dad,
}

/// Riddle question with two hints (TitleDetectives).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RiddleQuestion {
    /// Riddle-style description of the movie.
    pub question: String,
    /// First hint.
    pub hint1: String,
    /// Second, more revealing hint.
    pub hint2: String,
}

/// Invented sequel pitch (SequelSalad).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SequelQuestion {
    /// Plot of the made-up sequel.
    pub sequel_plot: String,
    /// Title of the made-up sequel.
    pub sequel_title: String,
    /// Prompt handed to the image generator for the poster.
    pub poster_prompt: String,
}

/// Four-option multiple-choice question (BttfTrivia, Trivia).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChoiceQuestion {
    /// The question text.
    pub question: String,
    /// First option.
    pub option_1: String,
    /// Second option.
    pub option_2: String,
    /// Third option.
    pub option_3: String,
    /// Fourth option.
    pub option_4: String,
    /// 1-based index of the correct option.
    pub correct_answer: u8,
}

impl ChoiceQuestion {
    /// Text of the 1-based option `index`, if in range.
    pub fn option_text(&self, index: u8) -> Option<&str> {
        match index {
            1 => Some(&self.option_1),
            2 => Some(&self.option_2),
            3 => Some(&self.option_3),
            4 => Some(&self.option_4),
            _ => None,
        }
    }
}

/// Generator judgment of a free-text answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FreeTextVerdict {
    /// Awarded points.
    pub points: u32,
    /// Verdict text read back to the player.
    pub answer: String,
}

/// Flavored feedback the generator produces for a multiple-choice answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChoiceFeedback {
    /// Feedback text read back to the player.
    pub answer: String,
}

/// Session data produced by [`QuizVariant::TitleDetectives`] `begin`.
#[derive(Debug, Clone)]
pub struct TitleDetectivesData {
    /// The generated riddle.
    pub question: RiddleQuestion,
    /// The movie to guess; never echoed to the player.
    pub movie: MovieDetails,
    /// Audio reference for the spoken question.
    pub speech: String,
}

/// Session data produced by [`QuizVariant::SequelSalad`] `begin`.
#[derive(Debug, Clone)]
pub struct SequelSaladData {
    /// The generated sequel pitch.
    pub question: SequelQuestion,
    /// The franchise to guess; never echoed to the player.
    pub franchise: String,
    /// Poster reference, if image generation succeeded.
    pub poster: Option<String>,
    /// Audio reference for the spoken pitch.
    pub speech: String,
}

/// Session data produced by [`QuizVariant::BttfTrivia`] `begin`.
#[derive(Debug, Clone)]
pub struct BttfTriviaData {
    /// The generated multiple-choice question.
    pub question: ChoiceQuestion,
    /// Audio reference for the spoken question.
    pub speech: String,
}

/// Session data produced by [`QuizVariant::Trivia`] `begin`.
#[derive(Debug, Clone)]
pub struct TriviaData {
    /// The generated multiple-choice question.
    pub question: ChoiceQuestion,
    /// The movie the question is about.
    pub movie: MovieDetails,
    /// Audio reference for the spoken question.
    pub speech: String,
}

/// Variant-specific session payload, tagged by the owning variant.
#[derive(Debug, Clone)]
pub enum QuizPayload {
    /// TitleDetectives session data.
    TitleDetectives(TitleDetectivesData),
    /// SequelSalad session data.
    SequelSalad(SequelSaladData),
    /// BttfTrivia session data.
    BttfTrivia(BttfTriviaData),
    /// Trivia session data.
    Trivia(TriviaData),
}

impl QuizPayload {
    /// Variant tag of this payload.
    pub fn variant(&self) -> QuizVariant {
        match self {
            QuizPayload::TitleDetectives(_) => QuizVariant::TitleDetectives,
            QuizPayload::SequelSalad(_) => QuizVariant::SequelSalad,
            QuizPayload::BttfTrivia(_) => QuizVariant::BttfTrivia,
            QuizPayload::Trivia(_) => QuizVariant::Trivia,
        }
    }
}

/// Evaluated TitleDetectives round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TitleDetectivesResult {
    /// The riddle that was asked.
    pub question: RiddleQuestion,
    /// The movie that had to be guessed.
    pub movie: MovieDetails,
    /// The player's free-text answer.
    pub user_answer: String,
    /// Generator judgment with awarded points.
    pub result: FreeTextVerdict,
    /// Audio reference for the spoken verdict.
    pub speech: String,
}

/// Evaluated SequelSalad round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SequelSaladResult {
    /// The sequel pitch that was shown.
    pub question: SequelQuestion,
    /// The franchise that had to be guessed.
    pub franchise: String,
    /// The player's free-text answer.
    pub user_answer: String,
    /// Generator judgment with awarded points.
    pub result: FreeTextVerdict,
    /// Audio reference for the spoken verdict.
    pub speech: String,
}

/// Evaluated BttfTrivia round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BttfTriviaResult {
    /// The question that was asked, including the correct index.
    pub question: ChoiceQuestion,
    /// The 1-based option the player picked.
    pub user_answer: u8,
    /// Flavored feedback from the generator.
    pub result: ChoiceFeedback,
    /// Awarded points (fixed value on exact index match).
    pub points: u32,
    /// Audio reference for the spoken feedback.
    pub speech: String,
}

/// Evaluated Trivia round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TriviaResult {
    /// The question that was asked, including the correct index.
    pub question: ChoiceQuestion,
    /// The movie the question was about.
    pub movie: MovieDetails,
    /// The 1-based option the player picked.
    pub user_answer: u8,
    /// Flavored feedback from the generator.
    pub result: ChoiceFeedback,
    /// Awarded points (fixed value on exact index match).
    pub points: u32,
    /// Audio reference for the spoken feedback.
    pub speech: String,
}

/// Variant-specific completion outcome, tagged by the owning variant.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum QuizOutcome {
    /// TitleDetectives result.
    TitleDetectives(TitleDetectivesResult),
    /// SequelSalad result.
    SequelSalad(SequelSaladResult),
    /// BttfTrivia result.
    BttfTrivia(BttfTriviaResult),
    /// Trivia result.
    Trivia(TriviaResult),
}

impl QuizOutcome {
    /// Variant tag of this outcome.
    pub fn variant(&self) -> QuizVariant {
        match self {
            QuizOutcome::TitleDetectives(_) => QuizVariant::TitleDetectives,
            QuizOutcome::SequelSalad(_) => QuizVariant::SequelSalad,
            QuizOutcome::BttfTrivia(_) => QuizVariant::BttfTrivia,
            QuizOutcome::Trivia(_) => QuizVariant::Trivia,
        }
    }

    /// Points awarded for this round.
    pub fn points(&self) -> u32 {
        match self {
            QuizOutcome::TitleDetectives(result) => result.result.points,
            QuizOutcome::SequelSalad(result) => result.result.points,
            QuizOutcome::BttfTrivia(result) => result.points,
            QuizOutcome::Trivia(result) => result.points,
        }
    }
}

/// Answer submitted by the player: free text or a 1-based option index,
/// depending on the variant.
///
/// Serializes untagged as well; request validation reports the offending
/// value back through the error params.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PlayerAnswer {
    /// 1-based multiple-choice option index.
    Choice(u8),
    /// Free-text guess.
    Text(String),
}

impl PlayerAnswer {
    /// Expect a free-text answer, rejecting option indices.
    pub fn as_text(&self) -> Result<&str, QuizError> {
        match self {
            PlayerAnswer::Text(text) => Ok(text),
            PlayerAnswer::Choice(_) => Err(QuizError::Validation(
                "this quiz expects a free-text answer".into(),
            )),
        }
    }

    /// Expect a 1-based option index within `1..=4`.
    pub fn as_choice(&self) -> Result<u8, QuizError> {
        match self {
            PlayerAnswer::Choice(index) if (1..=4).contains(index) => Ok(*index),
            PlayerAnswer::Choice(index) => Err(QuizError::Validation(format!(
                "answer option {index} is out of range (expected 1-4)"
            ))),
            PlayerAnswer::Text(_) => Err(QuizError::Validation(
                "this quiz expects an answer option between 1 and 4".into(),
            )),
        }
    }
}

/// Shared two-phase contract implemented by every quiz variant.
///
/// Implementations are stateless between calls: everything a round needs
/// lives in the [`QuizPayload`] and [`Conversation`] the engine passes back
/// in, so one instance serves unlimited concurrent games.
pub trait Quiz: Send + Sync {
    /// Produce the player-visible payload for a fresh round, advancing the
    /// supplied conversation.
    fn begin<'a>(
        &'a self,
        personality: Personality,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizPayload, QuizError>>;

    /// Consume the stored round data plus the player's answer and return the
    /// scored outcome, reusing the round's conversation.
    fn complete<'a>(
        &'a self,
        answer: &'a PlayerAnswer,
        payload: QuizPayload,
        conversation: &'a mut Conversation,
    ) -> BoxFuture<'a, Result<QuizOutcome, QuizError>>;
}

/// Internal guard for payload/variant mismatches, which indicate a bug in the
/// engine's dispatch rather than a client error.
pub(crate) fn payload_mismatch(expected: QuizVariant, got: &QuizPayload) -> QuizError {
    QuizError::Validation(format!(
        "session payload belongs to {} but {} was dispatched",
        got.variant(),
        expected
    ))
}
