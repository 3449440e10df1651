//! Text-to-speech client.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::{ProviderError, ProviderResult, SpeechSynthesizer};

const PROVIDER: &str = "speech";
const API_BASE: &str = "https://texttospeech.googleapis.com/v1";

const LANGUAGE_CODE: &str = "en-US";
const VOICE_NAME: &str = "en-US-Studio-M";
const SPEAKING_RATE: f32 = 0.85;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// HTTP client synthesizing narration audio and storing it below the media
/// directory. Callers only ever see the opaque `/audio/{id}.mp3` reference.
pub struct SpeechClient {
    http: reqwest::Client,
    api_key: String,
    audio_dir: PathBuf,
}

impl SpeechClient {
    /// Create a client writing synthesized audio below `audio_dir`.
    pub fn new(http: reqwest::Client, api_key: String, audio_dir: PathBuf) -> Self {
        Self {
            http,
            api_key,
            audio_dir,
        }
    }
}

impl SpeechSynthesizer for SpeechClient {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            let request = json!({
                "input": { "text": text },
                "voice": { "languageCode": LANGUAGE_CODE, "name": VOICE_NAME },
                "audioConfig": { "audioEncoding": "MP3", "speakingRate": SPEAKING_RATE },
            });

            let url = format!("{API_BASE}/text:synthesize?key={}", self.api_key);
            let response: SynthesizeResponse = self
                .http
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "synthesize request failed", err))?
                .error_for_status()
                .map_err(|err| ProviderError::new(PROVIDER, "synthesize request rejected", err))?
                .json()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "invalid synthesize response", err))?;

            let bytes = BASE64
                .decode(response.audio_content)
                .map_err(|err| ProviderError::new(PROVIDER, "audio payload not base64", err))?;

            let file_id = Uuid::new_v4();
            tokio::fs::create_dir_all(&self.audio_dir)
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "cannot create audio dir", err))?;
            let path = self.audio_dir.join(format!("{file_id}.mp3"));
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "cannot store audio", err))?;

            debug!(%file_id, "synthesized speech");
            Ok(format!("/audio/{file_id}.mp3"))
        })
    }
}
