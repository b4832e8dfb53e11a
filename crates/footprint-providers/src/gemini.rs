//! Gemini `generateContent` judgment engine.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use footprint_core::{EngineError, JudgmentEngine};

use crate::config::ProviderConfig;
use crate::error::{build_client, engine_transport, ClientError};

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Stateless Gemini client; safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(ClientError::MissingConfig("GEMINI_API_KEY"))?;
        Ok(Self {
            client: build_client(config.timeout, &config.user_agent)?,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.gemini_api_url.trim_end_matches('/'),
                config.gemini_model
            ),
            api_key,
        })
    }
}

#[async_trait]
impl JudgmentEngine for GeminiClient {
    #[instrument(skip_all, fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": 0.2}
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(engine_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(engine_transport)?;
        candidate_text(parsed).ok_or(EngineError::EmptyResponse)
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
