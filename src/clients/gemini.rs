//! Conversational generator client speaking the Gemini HTTP API in JSON mode.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, ChatRole, Conversation, ProviderError, ProviderResult};

const PROVIDER: &str = "gemini";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling temperature used for every generation turn.
const TEMPERATURE: f32 = 0.5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part<'a> {
    text: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    /// Asks the model for structured JSON replies so parsing stays strict.
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse<'a> {
    #[serde(default, borrow)]
    candidates: Vec<Candidate<'a>>,
}

#[derive(Debug, Deserialize)]
struct Candidate<'a> {
    #[serde(borrow)]
    content: CandidateContent<'a>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent<'a> {
    #[serde(default, borrow)]
    parts: Vec<Part<'a>>,
}

/// HTTP client for the generative chat endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for the given model (e.g. `gemini-1.5-flash`).
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    fn role_name(role: ChatRole) -> &'static str {
        match role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

impl ChatModel for GeminiClient {
    fn send<'a>(
        &'a self,
        conversation: &'a mut Conversation,
        prompt: String,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            // Replay the whole history plus the new prompt so the model sees
            // the question it asked when judging the answer.
            let mut contents: Vec<Content<'_>> = conversation
                .turns()
                .iter()
                .map(|turn| Content {
                    role: Self::role_name(turn.role),
                    parts: vec![Part {
                        text: turn.text.as_str().into(),
                    }],
                })
                .collect();
            contents.push(Content {
                role: Self::role_name(ChatRole::User),
                parts: vec![Part {
                    text: prompt.as_str().into(),
                }],
            });

            let request = GenerateRequest {
                contents,
                generation_config: GenerationConfig {
                    temperature: TEMPERATURE,
                    response_mime_type: "application/json",
                },
            };

            let url = format!(
                "{API_BASE}/models/{}:generateContent?key={}",
                self.model, self.api_key
            );
            let response = self
                .http
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "generate request failed", err))?
                .error_for_status()
                .map_err(|err| ProviderError::new(PROVIDER, "generate request rejected", err))?;

            let body = response
                .text()
                .await
                .map_err(|err| ProviderError::new(PROVIDER, "failed to read reply", err))?;
            let parsed: GenerateResponse<'_> = serde_json::from_str(&body)
                .map_err(|err| ProviderError::new(PROVIDER, "invalid reply envelope", err))?;

            let reply = parsed
                .candidates
                .first()
                .map(|candidate| {
                    candidate
                        .content
                        .parts
                        .iter()
                        .map(|part| part.text.as_ref())
                        .collect::<String>()
                })
                .ok_or_else(|| ProviderError::message(PROVIDER, "reply carried no candidates"))?;

            debug!(turns = conversation.turns().len(), "generation turn done");
            conversation.push_exchange(prompt, reply.clone());
            Ok(reply)
        })
    }
}
