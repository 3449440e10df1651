//! Mock collaborators shared by the quiz unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;

use crate::clients::{
    ChatModel, Conversation, FactSource, Identity, ImageGenerator, MovieDetails, MovieFacts,
    MovieProvider, MovieQuery, ProfileStore, ProviderError, ProviderResult, SpeechSynthesizer,
};
use crate::quiz::QuizVariant;

/// Chat model replaying a scripted list of replies in order.
pub struct ScriptedChat {
    replies: Mutex<Vec<ProviderResult<String>>>,
    calls: AtomicUsize,
}

impl ScriptedChat {
    /// Script the replies the model will produce, first to last.
    pub fn new(replies: Vec<ProviderResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor for all-successful replies.
    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|reply| Ok((*reply).into())).collect())
    }

    /// Number of generation calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChatModel for ScriptedChat {
    fn send<'a>(
        &'a self,
        conversation: &'a mut Conversation,
        prompt: String,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(ProviderError::message("scripted-chat", "script exhausted"));
            }
            let reply = replies.remove(0)?;
            conversation.push_exchange(prompt, reply.clone());
            Ok(reply)
        })
    }
}

/// Movie provider returning a fixed movie (or none).
pub struct StaticMovies {
    movie: Option<MovieDetails>,
}

impl StaticMovies {
    /// Always return `movie`.
    pub fn some(movie: MovieDetails) -> Self {
        Self { movie: Some(movie) }
    }

    /// Never find a qualifying movie.
    pub fn none() -> Self {
        Self { movie: None }
    }
}

impl MovieProvider for StaticMovies {
    fn random_movie<'a>(
        &'a self,
        _query: MovieQuery,
    ) -> BoxFuture<'a, ProviderResult<Option<MovieDetails>>> {
        Box::pin(async move { Ok(self.movie.clone()) })
    }
}

/// Speech synthesizer returning a fixed audio reference.
pub struct StaticSpeech;

impl SpeechSynthesizer for StaticSpeech {
    fn synthesize<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move { Ok("/audio/test.mp3".into()) })
    }
}

/// Image generator that records prompts and fails a configurable number of
/// leading attempts.
pub struct FlakyImages {
    failures_left: Mutex<u32>,
    prompts: Mutex<Vec<String>>,
}

impl FlakyImages {
    /// Fail the first `failures` generation attempts, then succeed.
    pub fn failing(failures: u32) -> Self {
        Self {
            failures_left: Mutex::new(failures),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ImageGenerator for FlakyImages {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(ProviderError::message("flaky-images", "safety rejection"));
            }
            Ok("/images/test.png".into())
        })
    }
}

/// Fact source with fixed topic facts and movie facts.
pub struct StaticFacts {
    topic: Option<String>,
    movie: Option<MovieFacts>,
}

impl StaticFacts {
    /// Serve the given topic facts and movie facts.
    pub fn new(topic: Option<String>, movie: Option<MovieFacts>) -> Self {
        Self { topic, movie }
    }
}

impl FactSource for StaticFacts {
    fn topic_facts<'a>(&'a self, _topic: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>> {
        Box::pin(async move { Ok(self.topic.clone()) })
    }

    fn random_movie_facts<'a>(&'a self) -> BoxFuture<'a, ProviderResult<Option<MovieFacts>>> {
        Box::pin(async move { Ok(self.movie.clone()) })
    }
}

/// Identity resolving every token to a fixed user.
pub struct StaticIdentity(pub Option<String>);

impl Identity for StaticIdentity {
    fn resolve<'a>(&'a self, _bearer_token: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { self.0.clone() })
    }
}

/// Profile store recording every call for later assertions.
#[derive(Default)]
pub struct RecordingProfiles {
    records: Mutex<Vec<(String, QuizVariant, u32)>>,
}

impl RecordingProfiles {
    /// Recorded `(user, variant, points)` entries.
    pub fn records(&self) -> Vec<(String, QuizVariant, u32)> {
        self.records.lock().unwrap().clone()
    }
}

impl ProfileStore for RecordingProfiles {
    fn record_game<'a>(
        &'a self,
        user_id: &'a str,
        variant: QuizVariant,
        points: u32,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.records
                .lock()
                .unwrap()
                .push((user_id.to_owned(), variant, points));
            Ok(())
        })
    }
}

/// A minimal movie fixture for variant tests.
pub fn movie(title: &str) -> MovieDetails {
    MovieDetails {
        id: 42,
        title: title.to_owned(),
        original_title: title.to_owned(),
        tagline: "tagline".into(),
        overview: "overview".into(),
        genres: Vec::new(),
        budget: 1_000_000,
        revenue: 5_000_000,
        vote_average: 7.5,
        vote_count: 1200,
        release_date: "1985-07-03".into(),
        runtime: 116,
        poster_url: None,
    }
}
