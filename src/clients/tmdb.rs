//! TMDB-backed movie metadata provider.

use futures::future::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::{MovieProvider, ProviderError, ProviderResult};

const PROVIDER: &str = "tmdb";
const API_BASE: &str = "https://api.themoviedb.org/3";

/// Selection thresholds for picking a random movie.
#[derive(Debug, Clone, Copy)]
pub struct MovieQuery {
    /// Lowest discover page to sample from (more popular movies first).
    pub page_min: u32,
    /// Highest discover page to sample from.
    pub page_max: u32,
    /// Minimum average rating.
    pub vote_avg_min: f32,
    /// Minimum number of ratings.
    pub vote_count_min: u32,
}

/// One genre entry of a movie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    /// Genre display name.
    pub name: String,
}

/// Metadata of a single movie, as fed into prompts and round results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieDetails {
    /// Upstream movie identifier.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Title in the original language.
    #[serde(default)]
    pub original_title: String,
    /// Marketing tagline.
    #[serde(default)]
    pub tagline: String,
    /// Plot overview.
    #[serde(default)]
    pub overview: String,
    /// Genres of the movie.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Production budget in USD.
    #[serde(default)]
    pub budget: u64,
    /// Box-office revenue in USD.
    #[serde(default)]
    pub revenue: u64,
    /// Average rating.
    #[serde(default)]
    pub vote_average: f32,
    /// Number of ratings.
    #[serde(default)]
    pub vote_count: u32,
    /// Release date (`YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: String,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: u32,
    /// Absolute poster URL, if a poster exists.
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl MovieDetails {
    /// Genre names joined for prompt interpolation.
    pub fn genre_list(&self) -> String {
        self.genres
            .iter()
            .map(|genre| genre.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct DiscoverPage {
    results: Vec<DiscoverEntry>,
}

#[derive(Debug, Deserialize)]
struct DiscoverEntry {
    id: u64,
}

/// HTTP client for the TMDB discover and details endpoints.
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: String,
    image_base_url: String,
}

impl TmdbClient {
    /// Create a client using the given bearer API key.
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            image_base_url: "https://image.tmdb.org/t/p/original".into(),
        }
    }

    async fn discover(&self, page: u32, query: &MovieQuery) -> ProviderResult<Vec<DiscoverEntry>> {
        let response = self
            .http
            .get(format!("{API_BASE}/discover/movie"))
            .bearer_auth(&self.api_key)
            .query(&[
                ("sort_by", "popularity.desc"),
                ("include_adult", "false"),
                ("include_video", "false"),
                ("language", "en-US"),
                ("with_original_language", "en"),
                ("vote_average.gte", &query.vote_avg_min.to_string()),
                ("vote_count.gte", &query.vote_count_min.to_string()),
                ("page", &page.to_string()),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "discover request failed", err))?
            .error_for_status()
            .map_err(|err| ProviderError::new(PROVIDER, "discover request rejected", err))?;

        let page: DiscoverPage = response
            .json()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "invalid discover response", err))?;
        Ok(page.results)
    }

    async fn details(&self, movie_id: u64) -> ProviderResult<MovieDetails> {
        let response = self
            .http
            .get(format!("{API_BASE}/movie/{movie_id}"))
            .bearer_auth(&self.api_key)
            .query(&[("language", "en-US")])
            .send()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "details request failed", err))?
            .error_for_status()
            .map_err(|err| ProviderError::new(PROVIDER, "details request rejected", err))?;

        let mut raw: serde_json::Value = response
            .json()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "invalid details response", err))?;

        // Resolve the relative poster path into an absolute URL before
        // decoding, mirroring what the API hands to clients elsewhere.
        let poster_url = raw
            .get("poster_path")
            .and_then(|path| path.as_str())
            .map(|path| format!("{}{}", self.image_base_url, path));
        if let (Some(url), Some(object)) = (poster_url, raw.as_object_mut()) {
            object.insert("poster_url".into(), serde_json::Value::String(url));
        }

        serde_json::from_value(raw)
            .map_err(|err| ProviderError::new(PROVIDER, "unexpected details shape", err))
    }
}

impl MovieProvider for TmdbClient {
    fn random_movie<'a>(
        &'a self,
        query: MovieQuery,
    ) -> BoxFuture<'a, ProviderResult<Option<MovieDetails>>> {
        Box::pin(async move {
            let page = rand::rng().random_range(query.page_min..=query.page_max);
            let candidates = self.discover(page, &query).await?;
            debug!(page, candidates = candidates.len(), "movie discover page");

            if candidates.is_empty() {
                return Ok(None);
            }
            let pick = &candidates[rand::rng().random_range(0..candidates.len())];

            Ok(Some(self.details(pick.id).await?))
        })
    }
}
