//! AI troubleshooting assistant

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::auth::API_KEY_HEADER;
use crate::{
    config::AssistantConfig,
    error::{AppError, AppResult},
};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "AI assistant API key not configured. Please set the ASSISTANT_API_KEY environment variable.";
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I encountered an error. Please check your API key and try again.";

/// Single-shot text completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system_instruction: &str, prompt: &str) -> AppResult<String>;
}

/// generateContent endpoint of the Gemini API
pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: &AssistantConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

fn text_content(text: &str) -> Content<'_> {
    Content {
        parts: vec![Part { text }],
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, system_instruction: &str, prompt: &str) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = GenerateRequest {
            system_instruction: text_content(system_instruction),
            contents: vec![text_content(prompt)],
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Assistant request failed: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("Assistant returned an error: {}", e.without_url())))?
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AppError::Internal(format!("Malformed assistant response: {}", e.without_url())))?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::Internal("Assistant returned no text".to_string()));
        }
        Ok(text)
    }
}

#[derive(Clone)]
pub struct AssistantService {
    backend: Option<Arc<dyn CompletionBackend>>,
    system_instruction: String,
}

impl AssistantService {
    pub fn new(config: &AssistantConfig) -> Self {
        let backend = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .map(|key| Arc::new(GeminiBackend::new(config, key)) as Arc<dyn CompletionBackend>);
        if backend.is_none() {
            tracing::warn!("Assistant API key is not set, AI features will not be available");
        }
        Self::with_backend(backend, config.system_instruction.clone())
    }

    pub fn with_backend(backend: Option<Arc<dyn CompletionBackend>>, system_instruction: String) -> Self {
        Self {
            backend,
            system_instruction,
        }
    }

    /// Markdown troubleshooting steps; never fails, errors become a fixed reply
    pub async fn troubleshooting_steps(&self, problem: &str) -> String {
        let Some(backend) = &self.backend else {
            return NOT_CONFIGURED_MESSAGE.to_string();
        };
        match backend.complete(&self.system_instruction, problem).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error calling assistant: {}", e);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}
