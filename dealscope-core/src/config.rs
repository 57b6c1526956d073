//! Pipeline configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scoring::DimensionWeights;

/// Settings the orchestrator needs at construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deal note generation settings
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Weights used when a request supplies none
    #[serde(default)]
    pub default_weights: DimensionWeights,
}

/// Retry and timeout bounds for deal note generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// Whether deal notes are generated at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Wall-clock bound for all attempts together
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Delay before the first retry; doubles for each later one
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Prompts longer than this are truncated
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_prompt_chars() -> usize {
    4000
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_retries: default_max_retries(),
            timeout_seconds: default_timeout_seconds(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

impl NarrativeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Delay after the given zero-based failed attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_narrative_config() {
        let config = NarrativeConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_prompt_chars, 4000);
    }

    #[test]
    fn test_backoff_doubles() {
        let config = NarrativeConfig::default();
        assert_eq!(config.backoff(0), Duration::from_millis(1000));
        assert_eq!(config.backoff(1), Duration::from_millis(2000));
        assert_eq!(config.backoff(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"narrative": {"max_retries": 5}}"#).unwrap();
        assert_eq!(config.narrative.max_retries, 5);
        assert_eq!(config.narrative.timeout_seconds, 30);
        assert_eq!(config.default_weights, DimensionWeights::default());
    }

    #[test]
    fn test_invalid_default_weights_rejected() {
        let result: Result<PipelineConfig, _> = serde_json::from_str(
            r#"{"default_weights": {"growth_potential": 1.0}}"#,
        );
        assert!(result.is_err());
    }
}
