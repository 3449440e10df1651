//! Shared application state: session storage, usage accounting, and the
//! handles every request handler needs.

pub mod session_store;
pub mod usage;

use std::sync::Arc;

pub use self::session_store::{QuizSession, SessionStore};
pub use self::usage::UsageLimiter;
use crate::{clients::Identity, config::AppConfig, quiz::engine::QuizEngine};

pub type SharedState = Arc<AppState>;

/// Central application state shared across request handlers.
pub struct AppState {
    config: AppConfig,
    sessions: Arc<SessionStore>,
    limiter: Arc<UsageLimiter>,
    engine: QuizEngine,
    identity: Arc<dyn Identity>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        sessions: Arc<SessionStore>,
        limiter: Arc<UsageLimiter>,
        engine: QuizEngine,
        identity: Arc<dyn Identity>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            sessions,
            limiter,
            engine,
            identity,
        })
    }

    /// Application configuration as loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Store of in-flight quiz sessions.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Daily per-variant usage limiter.
    pub fn limiter(&self) -> &Arc<UsageLimiter> {
        &self.limiter
    }

    /// The quiz orchestrator.
    pub fn engine(&self) -> &QuizEngine {
        &self.engine
    }

    /// Resolver for optional bearer identities.
    pub fn identity(&self) -> &Arc<dyn Identity> {
        &self.identity
    }
}
