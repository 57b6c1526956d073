pub mod analyze;
pub mod config;
pub mod reweight;
pub mod show;

use std::sync::Arc;

use anyhow::{Context, Result};
use dealscope_core::{FileAnalysisStore, Orchestrator};
use tracing::debug;

use crate::config::DealscopeConfig;
use crate::intelligence::JsonProfileIntelligence;

/// Build an orchestrator over the file-backed store in the configured data dir.
pub async fn orchestrator(config: &DealscopeConfig) -> Result<Orchestrator> {
    let data_dir = &config.storage.data_dir;
    let store = FileAnalysisStore::open(data_dir.clone())
        .await
        .with_context(|| format!("Failed to open analysis store at {}", data_dir.display()))?;
    let client = config.ai.client()?;
    debug!(
        data_dir = %data_dir.display(),
        ai = client.name(),
        "Building orchestrator"
    );

    Ok(Orchestrator::new(
        Arc::new(store),
        Arc::new(JsonProfileIntelligence),
        client,
        config.pipeline(),
    ))
}
