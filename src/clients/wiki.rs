//! Wikipedia-backed fact lookup.

use futures::future::BoxFuture;
use rand::Rng;
use serde::Deserialize;

use super::{FactSource, MovieDetails, MovieProvider, MovieQuery, ProviderError, ProviderResult};

const PROVIDER: &str = "wiki";
const API_BASE: &str = "https://en.wikipedia.org/w/api.php";

/// Movies picked for fact-based trivia are restricted to well-known titles so
/// a matching encyclopedia page is likely to exist.
const FACT_MOVIE_QUERY: MovieQuery = MovieQuery {
    page_min: 1,
    page_max: 10,
    vote_avg_min: 4.0,
    vote_count_min: 4000,
};

/// How many random movies to try before giving up on finding one with facts.
const MAX_MOVIE_LOOKUPS: u32 = 5;

/// Facts about a randomly picked movie, together with its metadata.
#[derive(Debug, Clone)]
pub struct MovieFacts {
    /// The movie the facts belong to.
    pub movie: MovieDetails,
    /// Free-form background text about the movie.
    pub facts: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: serde_json::Map<String, serde_json::Value>,
}

/// HTTP client reading page extracts from the encyclopedia API, paired with a
/// movie provider for the random-movie fact path.
pub struct WikiClient<P> {
    http: reqwest::Client,
    movies: P,
}

impl<P: MovieProvider> WikiClient<P> {
    /// Create a fact source backed by the given movie provider.
    pub fn new(http: reqwest::Client, movies: P) -> Self {
        Self { http, movies }
    }

    async fn search_titles(&self, term: &str) -> ProviderResult<Vec<String>> {
        let response: SearchResponse = self
            .http
            .get(API_BASE)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", term),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "search request failed", err))?
            .error_for_status()
            .map_err(|err| ProviderError::new(PROVIDER, "search request rejected", err))?
            .json()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "invalid search response", err))?;

        Ok(response
            .query
            .map(|query| query.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn page_extract(&self, title: &str) -> ProviderResult<Option<String>> {
        let response: ExtractResponse = self
            .http
            .get(API_BASE)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "extract request failed", err))?
            .error_for_status()
            .map_err(|err| ProviderError::new(PROVIDER, "extract request rejected", err))?
            .json()
            .await
            .map_err(|err| ProviderError::new(PROVIDER, "invalid extract response", err))?;

        let extract = response.query.and_then(|query| {
            query.pages.values().find_map(|page| {
                page.get("extract")
                    .and_then(|value| value.as_str())
                    .filter(|text| !text.is_empty())
                    .map(str::to_owned)
            })
        });
        Ok(extract)
    }
}

impl<P: MovieProvider> FactSource for WikiClient<P> {
    fn topic_facts<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>> {
        Box::pin(async move {
            let titles = self.search_titles(topic).await?;
            if titles.is_empty() {
                return Ok(None);
            }

            let title = &titles[rand::rng().random_range(0..titles.len())];
            self.page_extract(title).await
        })
    }

    fn random_movie_facts<'a>(&'a self) -> BoxFuture<'a, ProviderResult<Option<MovieFacts>>> {
        Box::pin(async move {
            // Not every movie has a page; retry with a fresh pick a few times
            // before reporting a content gap.
            for _ in 0..MAX_MOVIE_LOOKUPS {
                let Some(movie) = self.movies.random_movie(FACT_MOVIE_QUERY).await? else {
                    continue;
                };

                let titles = self.search_titles(&movie.original_title).await?;
                let Some(title) = titles.first() else {
                    continue;
                };

                if let Some(facts) = self.page_extract(title).await? {
                    return Ok(Some(MovieFacts { movie, facts }));
                }
            }

            Ok(None)
        })
    }
}
