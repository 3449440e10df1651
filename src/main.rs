//! Movie Detectives Back binary entrypoint wiring REST routes and upstream provider clients.

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clients;
mod config;
mod dto;
mod error;
mod quiz;
mod routes;
mod state;

use clients::{
    gemini::GeminiClient, imagen::ImagenClient, profile::ProfileClient, speech::SpeechClient,
    tmdb::TmdbClient, wiki::WikiClient,
};
use config::AppConfig;
use quiz::{
    bttf_trivia::BttfTrivia, engine::QuizEngine, generate::RetryingGenerator,
    sequel_salad::SequelSalad, title_detectives::TitleDetectives, trivia::Trivia,
};
use state::{AppState, SessionStore, SharedState, UsageLimiter};

/// How often the background task sweeps expired sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = build_state(config).context("assembling application state")?;

    tokio::spawn(run_session_sweeper(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Wire the upstream clients, the store and limiter, and the quiz engine into
/// the shared application state.
fn build_state(config: AppConfig) -> anyhow::Result<SharedState> {
    let http = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;

    let movies = Arc::new(TmdbClient::new(http.clone(), config.tmdb_api_key.clone()));
    let chat = Arc::new(GeminiClient::new(
        http.clone(),
        config.gcp_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let images = Arc::new(ImagenClient::new(
        http.clone(),
        config.gcp_api_key.clone(),
        config.imagen_model.clone(),
        config.media_dir.clone(),
    ));
    let speech = Arc::new(SpeechClient::new(
        http.clone(),
        config.gcp_api_key.clone(),
        config.media_dir.clone(),
    ));
    let facts = Arc::new(WikiClient::new(
        http.clone(),
        TmdbClient::new(http.clone(), config.tmdb_api_key.clone()),
    ));
    let profiles = Arc::new(ProfileClient::new(http, config.profile_service_url.clone()));

    let generator = RetryingGenerator::new(chat, config.max_retries, config.retry_delay);
    let sessions = Arc::new(SessionStore::new(
        config.session_capacity,
        config.session_ttl,
    ));
    let limiter = Arc::new(UsageLimiter::new(config.daily_limits.clone()));

    let engine = QuizEngine::new(
        sessions.clone(),
        limiter.clone(),
        profiles.clone(),
        TitleDetectives::new(movies, generator.clone(), speech.clone()),
        SequelSalad::new(
            config.franchises.clone(),
            generator.clone(),
            images,
            speech.clone(),
        ),
        BttfTrivia::new(facts.clone(), generator.clone(), speech.clone()),
        Trivia::new(facts, generator, speech),
    );

    Ok(AppState::new(config, sessions, limiter, engine, profiles))
}

/// Periodically drop expired sessions so abandoned rounds do not pin memory
/// until their slot is read.
async fn run_session_sweeper(state: SharedState) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        state.sessions().sweep();
        debug!(active = state.sessions().len(), "session sweep finished");
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
