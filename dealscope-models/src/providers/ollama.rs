//! Ollama-backed inference client.
//!
//! Talks to `/api/generate` on a local or remote Ollama instance. Object and
//! array requests ask Ollama for JSON output; the caller still extracts and
//! validates the payload.
//!
//! ```ignore
//! use dealscope_models::providers::OllamaClient;
//!
//! let client = OllamaClient::new("llama3.1");  // localhost:11434
//! let client = OllamaClient::with_base_url("http://10.0.0.5:11434", "llama3.1");
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InferenceClient;
use crate::{Error, ExpectedShape, GenerationRequest, GenerationResponse, Result};

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ────────────────────────────────────────────────────────────────────────────
// Ollama API Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    model: String,
    response: String,
}

// ────────────────────────────────────────────────────────────────────────────
// OllamaClient
// ────────────────────────────────────────────────────────────────────────────

/// Inference client for an Ollama server.
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for `model` on localhost:11434.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, model)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> OllamaGenerateRequest<'a> {
        let format = match request.expected_shape {
            ExpectedShape::Object | ExpectedShape::Array => Some("json"),
            ExpectedShape::Text => None,
        };
        let options = (request.temperature.is_some() || request.max_tokens.is_some()).then(|| {
            OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            }
        });
        OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            format,
            options,
        }
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(model = %self.model, shape = ?request.expected_shape, "ollama generate");

        let send = self.client.post(&url).json(&self.body(&request)).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))?
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::ProviderApi(format!(
                "Ollama API returned status {}",
                response.status()
            )));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        Ok(GenerationResponse {
            text: body.response,
            model: Some(body.model),
        })
    }
}
