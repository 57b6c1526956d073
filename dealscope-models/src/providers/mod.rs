//! Inference client trait and implementations.
//!
//! The [`InferenceClient`] trait is the only way the analysis engines reach a
//! model. Callers must treat every call as unreliable: validate the payload
//! and fall back deterministically rather than propagate malformed output.
//!
//! # Example
//!
//! ```ignore
//! use dealscope_models::providers::{InferenceClient, OllamaClient};
//! use dealscope_models::{ExpectedShape, GenerationRequest};
//!
//! async fn risks(client: &dyn InferenceClient) {
//!     let request = GenerationRequest::new("List market risks", ExpectedShape::Array);
//!     let response = client.generate(request).await?;
//!     println!("{}", response.text);
//! }
//! ```

mod ollama;

use async_trait::async_trait;

pub use ollama::{DEFAULT_BASE_URL as OLLAMA_DEFAULT_BASE_URL, OllamaClient};

use crate::{Error, GenerationRequest, GenerationResponse, Result};

/// A backend capable of structured generation.
///
/// # Required Methods
///
/// - [`name`](InferenceClient::name) - Backend identifier (e.g., "ollama")
/// - [`generate`](InferenceClient::generate) - Single non-streaming generation
///
/// # Optional Methods
///
/// - [`is_available`](InferenceClient::is_available) - Whether calls are worth attempting
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Returns the backend name.
    fn name(&self) -> &str;

    /// Whether the client is configured to make calls at all.
    ///
    /// Engines skip optional AI work (benchmark insights, deal notes) when
    /// this returns false.
    fn is_available(&self) -> bool {
        true
    }

    /// Perform one generation request. No retries happen here.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}

/// Client used when AI assistance is switched off.
///
/// Every call fails with [`Error::Unavailable`], which sends the engines down
/// their deterministic paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClient;

#[async_trait]
impl InferenceClient for DisabledClient {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse> {
        Err(Error::Unavailable("AI assistance is disabled".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpectedShape;

    struct EchoClient;

    #[async_trait]
    impl InferenceClient for EchoClient {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
            Ok(GenerationResponse::text(format!("Echo: {}", request.prompt)))
        }
    }

    #[tokio::test]
    async fn client_generate_returns_response() {
        let client = EchoClient;
        let response = client
            .generate(GenerationRequest::new("hello", ExpectedShape::Text))
            .await
            .unwrap();
        assert_eq!(response.text, "Echo: hello");
    }

    #[test]
    fn default_is_available_returns_true() {
        assert!(EchoClient.is_available());
    }

    #[tokio::test]
    async fn disabled_client_is_unavailable() {
        let client = DisabledClient;
        assert!(!client.is_available());

        let err = client
            .generate(GenerationRequest::new("hello", ExpectedShape::Text))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(err.to_string().contains("disabled"));
    }
}
