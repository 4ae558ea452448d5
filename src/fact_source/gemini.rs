// WHY: Google Gemini backend for the model fact source
// One generateContent call per prompt; the reply is the first candidate's text parts joined.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

use super::model::ModelBackend;
use crate::error::ModelError;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Gemini `generateContent` client
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let start = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}]
            }]
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_resp: GeminiResponse = resp.json().await?;
        let text: String = api_resp
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Gemini call completed"
        );

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }
}
