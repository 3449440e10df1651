//! Poster image generation client.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::{ImageGenerator, ProviderError, ProviderResult};

const PROVIDER: &str = "imagen";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: String,
}

/// HTTP client generating one poster image per prompt and storing it under the
/// media directory. Callers only ever see the opaque `/images/{id}.png`
/// reference; serving and cleanup of the files happen elsewhere.
pub struct ImagenClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    images_dir: PathBuf,
}

impl ImagenClient {
    /// Create a client writing generated posters below `images_dir`.
    pub fn new(http: reqwest::Client, api_key: String, model: String, images_dir: PathBuf) -> Self {
        Self {
            http,
            api_key,
            model,
            images_dir,
        }
    }
}

impl ImageGenerator for ImagenClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            let request = json!({
                "instances": [{ "prompt": prompt }],
                "parameters": {
                    "sampleCount": 1,
                    "aspectRatio": "3:4",
                    "safetyFilterLevel": "block_few",
                    "personGeneration": "allow_adult",
                }
            });

            let url = format!(
                "{API_BASE}/models/{}:predict?key={}",
                self.model, self.api_key
            );
            let response: PredictResponse = self
                .http
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "predict request failed", err))?
                .error_for_status()
                .map_err(|err| ProviderError::new(PROVIDER, "predict request rejected", err))?
                .json()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "invalid predict response", err))?;

            let prediction = response
                .predictions
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::message(PROVIDER, "no image was generated"))?;
            let bytes = BASE64
                .decode(prediction.bytes_base64_encoded)
                .map_err(|err| ProviderError::new(PROVIDER, "image payload not base64", err))?;

            let file_id = Uuid::new_v4();
            tokio::fs::create_dir_all(&self.images_dir)
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "cannot create images dir", err))?;
            let path = self.images_dir.join(format!("{file_id}.png"));
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "cannot store image", err))?;

            info!(%file_id, "generated poster image");
            Ok(format!("/images/{file_id}.png"))
        })
    }
}
