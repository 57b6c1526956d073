//! Request and response types for structured generation.

use serde::{Deserialize, Serialize};

/// Shape the caller expects the generated payload to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedShape {
    /// A single JSON object.
    Object,
    /// A JSON array.
    Array,
    /// Free text, no JSON required.
    Text,
}

/// A structured-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub expected_shape: ExpectedShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Create a request for the given prompt and shape.
    pub fn new(prompt: impl Into<String>, expected_shape: ExpectedShape) -> Self {
        Self {
            prompt: prompt.into(),
            expected_shape,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens to generate.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Raw output of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    /// Model that produced the text, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }
}
