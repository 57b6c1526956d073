use super::types::{
    AiConfig, DealscopeConfig, RawAiConfig, RawDealscopeConfig, RawNarrativeConfig,
    RawStorageConfig, StorageConfig,
};
use anyhow::{Context, Result};
use dealscope_core::{DimensionWeights, NarrativeConfig};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

/// One TOML file in the merge order
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    pub name: &'static str,
    pub path: PathBuf,
}

impl ConfigLayer {
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl ConfigLoader {
    /// Load merged configuration (defaults, then user, then project)
    pub fn load() -> Result<DealscopeConfig> {
        let mut raw = RawDealscopeConfig::default();
        for layer in Self::layers() {
            if layer.exists() {
                debug!(layer = layer.name, path = %layer.path.display(), "Merging config layer");
                raw = Self::merge_raw(raw, Self::read_raw(&layer.path)?);
            }
        }
        Self::finalize(raw)
    }

    /// Config files in merge order; later layers win
    pub fn layers() -> Vec<ConfigLayer> {
        let mut layers = Vec::with_capacity(2);
        if let Some(path) = Self::user_config_path() {
            layers.push(ConfigLayer { name: "user", path });
        }
        layers.push(ConfigLayer {
            name: "project",
            path: Self::project_config_path(),
        });
        layers
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dealscope").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with DEALSCOPE_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("DEALSCOPE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".dealscope/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawDealscopeConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawDealscopeConfig, overlay: RawDealscopeConfig) -> RawDealscopeConfig {
        RawDealscopeConfig {
            ai: RawAiConfig {
                enabled: overlay.ai.enabled.or(base.ai.enabled),
                backend: overlay.ai.backend.or(base.ai.backend),
                base_url: overlay.ai.base_url.or(base.ai.base_url),
                model: overlay.ai.model.or(base.ai.model),
                request_timeout_seconds: overlay
                    .ai
                    .request_timeout_seconds
                    .or(base.ai.request_timeout_seconds),
            },
            narrative: RawNarrativeConfig {
                enabled: overlay.narrative.enabled.or(base.narrative.enabled),
                max_retries: overlay.narrative.max_retries.or(base.narrative.max_retries),
                timeout_seconds: overlay
                    .narrative
                    .timeout_seconds
                    .or(base.narrative.timeout_seconds),
                initial_backoff_ms: overlay
                    .narrative
                    .initial_backoff_ms
                    .or(base.narrative.initial_backoff_ms),
                max_prompt_chars: overlay
                    .narrative
                    .max_prompt_chars
                    .or(base.narrative.max_prompt_chars),
            },
            storage: RawStorageConfig {
                data_dir: overlay.storage.data_dir.or(base.storage.data_dir),
            },
            // Weights only make sense as a complete set, so they replace wholesale
            weights: overlay.weights.or(base.weights),
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawDealscopeConfig) -> Result<DealscopeConfig> {
        let ai_defaults = AiConfig::default();
        let narrative_defaults = NarrativeConfig::default();

        let weights = match raw.weights {
            Some(map) => DimensionWeights::from_map(&map).context("Invalid [weights] section")?,
            None => DimensionWeights::default(),
        };

        Ok(DealscopeConfig {
            ai: AiConfig {
                enabled: raw.ai.enabled.unwrap_or(ai_defaults.enabled),
                backend: raw.ai.backend.unwrap_or(ai_defaults.backend),
                base_url: raw.ai.base_url.unwrap_or(ai_defaults.base_url),
                model: raw.ai.model.unwrap_or(ai_defaults.model),
                request_timeout_seconds: raw
                    .ai
                    .request_timeout_seconds
                    .unwrap_or(ai_defaults.request_timeout_seconds),
            },
            narrative: NarrativeConfig {
                enabled: raw.narrative.enabled.unwrap_or(narrative_defaults.enabled),
                max_retries: raw
                    .narrative
                    .max_retries
                    .unwrap_or(narrative_defaults.max_retries),
                timeout_seconds: raw
                    .narrative
                    .timeout_seconds
                    .unwrap_or(narrative_defaults.timeout_seconds),
                initial_backoff_ms: raw
                    .narrative
                    .initial_backoff_ms
                    .unwrap_or(narrative_defaults.initial_backoff_ms),
                max_prompt_chars: raw
                    .narrative
                    .max_prompt_chars
                    .unwrap_or(narrative_defaults.max_prompt_chars),
            },
            storage: raw
                .storage
                .data_dir
                .map(|data_dir| StorageConfig { data_dir })
                .unwrap_or_default(),
            weights,
        })
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<DealscopeConfig> {
        if path.exists() {
            Self::finalize(Self::read_raw(path)?)
        } else {
            Self::finalize(RawDealscopeConfig::default())
        }
    }
}
