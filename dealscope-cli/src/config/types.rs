use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use dealscope_core::{DimensionWeights, NarrativeConfig, PipelineConfig};
use dealscope_models::providers::{
    DisabledClient, InferenceClient, OLLAMA_DEFAULT_BASE_URL, OllamaClient,
};
use serde::{Deserialize, Serialize};

use crate::paths;

/// Default model for the Ollama backend
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Default per-request timeout for AI calls
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDealscopeConfig {
    #[serde(default)]
    pub ai: RawAiConfig,

    #[serde(default)]
    pub narrative: RawNarrativeConfig,

    #[serde(default)]
    pub storage: RawStorageConfig,

    /// Default dimension weights, validated when finalized
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAiConfig {
    pub enabled: Option<bool>,
    pub backend: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawNarrativeConfig {
    pub enabled: Option<bool>,
    pub max_retries: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub initial_backoff_ms: Option<u64>,
    pub max_prompt_chars: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    pub data_dir: Option<PathBuf>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DealscopeConfig {
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub narrative: NarrativeConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub weights: DimensionWeights,
}

impl DealscopeConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            narrative: self.narrative.clone(),
            default_weights: self.weights,
        }
    }
}

/// AI inference backend settings. AI assistance is opt-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Whether engines call the AI backend at all
    pub enabled: bool,

    /// Backend name; only "ollama" is supported
    pub backend: String,

    /// Backend base URL
    pub base_url: String,

    /// Model name passed to the backend
    pub model: String,

    /// Per-request timeout
    pub request_timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: "ollama".to_string(),
            base_url: OLLAMA_DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl AiConfig {
    /// Build the inference client shared by every engine
    pub fn client(&self) -> Result<Arc<dyn InferenceClient>> {
        if !self.enabled {
            return Ok(Arc::new(DisabledClient));
        }
        match self.backend.as_str() {
            "ollama" => Ok(Arc::new(
                OllamaClient::with_base_url(&self.base_url, &self.model)
                    .with_timeout(Duration::from_secs(self.request_timeout_seconds)),
            )),
            other => bail!("Unknown AI backend '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the file-backed analysis store
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: paths::data_dir(),
        }
    }
}
