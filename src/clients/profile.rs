//! Identity resolution and persistent player profiles.
//!
//! Both collaborators talk to an external profile service over HTTP. When no
//! service is configured the backend still runs: every caller is treated as
//! unauthenticated and score recording becomes a no-op.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Identity, ProfileStore, ProviderError, ProviderResult};
use crate::quiz::QuizVariant;

const PROVIDER: &str = "profile";

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    user_id: String,
}

#[derive(Debug, Serialize)]
struct RecordGameRequest<'a> {
    variant: QuizVariant,
    points: u32,
    user_id: &'a str,
}

/// HTTP client for the profile service; `base_url = None` disables both the
/// identity and the recording path.
pub struct ProfileClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl ProfileClient {
    /// Create a client; pass `None` to run without a profile service.
    pub fn new(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self { http, base_url }
    }
}

impl Identity for ProfileClient {
    fn resolve<'a>(&'a self, bearer_token: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            let base_url = self.base_url.as_ref()?;

            // Any verification problem downgrades the caller to anonymous
            // play instead of failing the request.
            let response = self
                .http
                .get(format!("{base_url}/identity"))
                .bearer_auth(bearer_token)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match response {
                Ok(response) => match response.json::<ResolveResponse>().await {
                    Ok(resolved) => Some(resolved.user_id),
                    Err(err) => {
                        debug!(error = %err, "identity response not parseable");
                        None
                    }
                },
                Err(err) => {
                    debug!(error = %err, "identity verification failed");
                    None
                }
            }
        })
    }
}

impl ProfileStore for ProfileClient {
    fn record_game<'a>(
        &'a self,
        user_id: &'a str,
        variant: QuizVariant,
        points: u32,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let Some(base_url) = self.base_url.as_ref() else {
                warn!(%variant, "no profile service configured; dropping game record");
                return Ok(());
            };

            self.http
                .post(format!("{base_url}/games"))
                .json(&RecordGameRequest {
                    variant,
                    points,
                    user_id,
                })
                .send()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "record request failed", err))?
                .error_for_status()
                .map_err(|err| ProviderError::new(PROVIDER, "record request rejected", err))?;

            Ok(())
        })
    }
}
