//! Application configuration: upstream credentials from the environment plus a
//! JSON file carrying the franchise list and per-variant daily limits.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::quiz::QuizVariant;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIE_DETECTIVES_CONFIG_PATH";

/// Daily ceiling applied to a variant with no configured limit.
const DEFAULT_DAILY_LIMIT: u32 = 100;
/// How long an unanswered session stays reachable.
const DEFAULT_SESSION_TTL_SECS: u64 = 600;
/// Maximum number of concurrently tracked sessions.
const DEFAULT_SESSION_CAPACITY: usize = 100;
/// Retry ceiling for malformed generator output.
const DEFAULT_MAX_RETRIES: u32 = 10;
/// Fixed delay between generation retries.
const DEFAULT_RETRY_DELAY_SECS: u64 = 1;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TMDB bearer API key.
    pub tmdb_api_key: String,
    /// Key for the generative chat, image, and speech endpoints.
    pub gcp_api_key: String,
    /// Chat model name.
    pub gemini_model: String,
    /// Image model name.
    pub imagen_model: String,
    /// Optional profile service base URL; absent means anonymous-only play.
    pub profile_service_url: Option<String>,
    /// Directory that receives generated media files.
    pub media_dir: PathBuf,
    /// Shared secret gating administrative operations; absent disables them.
    pub admin_secret: Option<String>,
    /// Per-variant daily play ceilings.
    pub daily_limits: IndexMap<QuizVariant, u32>,
    /// Franchise pool for the sequel-salad variant.
    pub franchises: Vec<String>,
    /// Session time-to-live.
    pub session_ttl: Duration,
    /// Session store capacity bound.
    pub session_capacity: usize,
    /// Retry ceiling for malformed generator output.
    pub max_retries: u32,
    /// Fixed delay between generation retries.
    pub retry_delay: Duration,
}

impl AppConfig {
    /// Load the configuration from the environment and the JSON config file,
    /// falling back to baked-in defaults for everything but credentials.
    pub fn load() -> Self {
        let file = FileConfig::load();

        let mut daily_limits: IndexMap<QuizVariant, u32> = QuizVariant::ALL
            .into_iter()
            .map(|variant| (variant, DEFAULT_DAILY_LIMIT))
            .collect();
        for (variant, limit) in file.daily_limits {
            daily_limits.insert(variant, limit);
        }

        Self {
            tmdb_api_key: env_string("TMDB_API_KEY"),
            gcp_api_key: env_string("GCP_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into()),
            imagen_model: env::var("IMAGEN_MODEL")
                .unwrap_or_else(|_| "imagen-3.0-generate-001".into()),
            profile_service_url: env::var("PROFILE_SERVICE_URL").ok(),
            media_dir: env::var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/movie-detectives")),
            admin_secret: env::var("ADMIN_SECRET").ok().filter(|s| !s.is_empty()),
            daily_limits,
            franchises: file.franchises,
            session_ttl: Duration::from_secs(env_u64("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)),
            session_capacity: env_u64("SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY as u64) as usize,
            max_retries: env_u64("QUIZ_MAX_RETRIES", DEFAULT_MAX_RETRIES as u64) as u32,
            retry_delay: Duration::from_secs(env_u64(
                "QUIZ_RETRY_DELAY_SECS",
                DEFAULT_RETRY_DELAY_SECS,
            )),
        }
    }
}

fn env_string(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!(variable = name, "credential not set; upstream calls will fail");
        String::new()
    })
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// JSON representation of the configuration file located at
/// [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    daily_limits: IndexMap<QuizVariant, u32>,
    #[serde(default = "default_franchises")]
    franchises: Vec<String>,
}

impl FileConfig {
    fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<FileConfig>(&contents) {
                Ok(file) => {
                    info!(
                        path = %path.display(),
                        franchises = file.franchises.len(),
                        "loaded quiz config file"
                    );
                    file
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::built_in()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::built_in()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::built_in()
            }
        }
    }

    fn built_in() -> Self {
        Self {
            daily_limits: IndexMap::new(),
            franchises: default_franchises(),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in franchise pool shipped with the binary.
fn default_franchises() -> Vec<String> {
    [
        "Back to the Future",
        "Jurassic Park",
        "The Matrix",
        "Indiana Jones",
        "Ghostbusters",
        "Pirates of the Caribbean",
        "The Terminator",
        "Alien",
        "Rocky",
        "Toy Story",
        "Shrek",
        "The Lord of the Rings",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}
