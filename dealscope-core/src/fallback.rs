//! AI-first generation with deterministic fallback.
//!
//! One attempt against the inference client, shape extraction, caller
//! validation, and on any failure the caller's deterministic fallback.
//! There is no retry here; a bad answer is replaced, not re-asked.

use std::fmt;
use std::sync::Arc;

use dealscope_models::providers::InferenceClient;
use dealscope_models::{GenerationRequest, extract_payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a generated value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Ai,
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provenance::Ai => "ai",
            Provenance::Fallback => "fallback",
        })
    }
}

/// A value together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub provenance: Provenance,
    /// Why the fallback was used, when it was.
    pub fallback_reason: Option<String>,
}

impl<T> Sourced<T> {
    pub fn ai(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Ai,
            fallback_reason: None,
        }
    }

    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback,
            fallback_reason: Some(reason.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Shared adapter around an injected inference client.
#[derive(Clone)]
pub struct FallbackAdapter {
    client: Arc<dyn InferenceClient>,
}

impl FallbackAdapter {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_available()
    }

    /// Single AI attempt with extraction and validation.
    ///
    /// Returns the failure reason instead of a value when anything goes wrong,
    /// so callers can blend partial AI output with their own fallback.
    pub async fn attempt<T, V>(&self, request: GenerationRequest, validate: V) -> Result<T, String>
    where
        V: FnOnce(Value) -> Result<T, String>,
    {
        if !self.client.is_available() {
            return Err(format!("{} client unavailable", self.client.name()));
        }
        let shape = request.expected_shape;
        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| e.to_string())?;
        let payload = extract_payload(&response.text, shape).map_err(|e| e.to_string())?;
        validate(payload)
    }

    /// AI attempt, falling back deterministically on any failure.
    pub async fn generate<T, V, F>(&self, request: GenerationRequest, validate: V, fallback: F) -> Sourced<T>
    where
        V: FnOnce(Value) -> Result<T, String>,
        F: FnOnce() -> T,
    {
        match self.attempt(request, validate).await {
            Ok(value) => Sourced::ai(value),
            Err(reason) => {
                tracing::warn!(client = self.client.name(), reason = %reason, "AI generation rejected, using fallback");
                Sourced::fallback(fallback(), reason)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted inference clients shared by engine tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use dealscope_models::providers::InferenceClient;
    use dealscope_models::{Error, GenerationRequest, GenerationResponse, Result};

    /// Replays queued responses, then fails with `Unavailable`.
    #[derive(Default)]
    pub struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub fn with_responses(responses: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn push_error(&self, error: Error) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedClient {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
            self.prompts.lock().unwrap().push(request.prompt);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(GenerationResponse::text(text)),
                Some(Err(e)) => Err(e),
                None => Err(Error::Unavailable("script exhausted".to_string())),
            }
        }
    }

    /// Answers every prompt with the same text.
    pub struct FixedClient(pub &'static str);

    #[async_trait]
    impl InferenceClient for FixedClient {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse> {
            Ok(GenerationResponse::text(self.0))
        }
    }
}
