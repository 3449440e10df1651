//! External collaborator boundaries: conversational generator, movie metadata,
//! image generation, speech synthesis, fact lookup, identity, and profiles.
//!
//! Every collaborator is a trait with [`BoxFuture`] methods so the engine and
//! the quiz variants stay mockable in tests and agnostic of the transport.

pub mod gemini;
pub mod imagen;
pub mod profile;
pub mod speech;
pub mod tmdb;
pub mod wiki;

use std::error::Error;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quiz::QuizVariant;

pub use self::tmdb::{MovieDetails, MovieQuery};
pub use self::wiki::MovieFacts;

/// Result alias for collaborator calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Transport-level failure from an external collaborator.
///
/// Deliberately opaque towards callers: retrying the same conversational turn
/// is never safe once the upstream may have advanced, so these errors always
/// propagate immediately.
#[derive(Debug, Error)]
#[error("{provider} request failed: {message}")]
pub struct ProviderError {
    /// Short name of the failing collaborator (for logs).
    pub provider: &'static str,
    /// Human-readable description of the failure.
    pub message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ProviderError {
    /// Construct a provider error from any transport failure.
    pub fn new(
        provider: &'static str,
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Construct a provider error without an underlying source.
    pub fn message(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
            source: None,
        }
    }
}

/// Role of a single turn within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Prompt sent by this backend.
    User,
    /// Reply produced by the generator.
    Model,
}

/// One prompt or reply inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who produced the turn.
    pub role: ChatRole,
    /// Raw text of the turn.
    pub text: String,
}

/// Opaque handle to an ongoing multi-turn exchange with the generator.
///
/// Owned exclusively by one quiz session; the same handle must be reused
/// (never recreated) when the answer is evaluated, so the generator sees the
/// question it asked earlier.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    /// Start an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns exchanged so far, oldest first.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Record a prompt/reply pair produced by one generation call.
    pub fn push_exchange(&mut self, prompt: String, reply: String) {
        self.turns.push(ChatTurn {
            role: ChatRole::User,
            text: prompt,
        });
        self.turns.push(ChatTurn {
            role: ChatRole::Model,
            text: reply,
        });
    }
}

/// Conversational generator producing raw (expected-JSON) text replies.
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as the next turn of `conversation` and return the raw
    /// reply text. Implementations append the exchange to the conversation.
    fn send<'a>(
        &'a self,
        conversation: &'a mut Conversation,
        prompt: String,
    ) -> BoxFuture<'a, ProviderResult<String>>;
}

/// Movie metadata provider.
pub trait MovieProvider: Send + Sync {
    /// Pick a random movie matching the query, or `None` when nothing
    /// qualifies.
    fn random_movie<'a>(
        &'a self,
        query: MovieQuery,
    ) -> BoxFuture<'a, ProviderResult<Option<MovieDetails>>>;
}

/// Image generation client returning opaque media references.
pub trait ImageGenerator: Send + Sync {
    /// Generate one image for `prompt` and return its reference identifier.
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, ProviderResult<String>>;
}

/// Text-to-speech client returning opaque media references.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the audio reference identifier.
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ProviderResult<String>>;
}

/// Background-fact lookup used by the trivia variants.
pub trait FactSource: Send + Sync {
    /// Facts about a fixed topic, or `None` when no source page exists.
    fn topic_facts<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>>;

    /// Facts about a randomly picked, reasonably well-known movie, or `None`
    /// when no qualifying movie with a fact page could be found.
    fn random_movie_facts<'a>(&'a self) -> BoxFuture<'a, ProviderResult<Option<MovieFacts>>>;
}

/// Identity collaborator resolving bearer tokens to user ids.
pub trait Identity: Send + Sync {
    /// Resolve an `Authorization` bearer token to a user id; `None` means the
    /// caller plays unauthenticated (token problems are not errors).
    fn resolve<'a>(&'a self, bearer_token: &'a str) -> BoxFuture<'a, Option<String>>;
}

/// Persistent per-user score/game tallies.
pub trait ProfileStore: Send + Sync {
    /// Record one finished game of `variant` worth `points` for `user_id`.
    fn record_game<'a>(
        &'a self,
        user_id: &'a str,
        variant: QuizVariant,
        points: u32,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}
