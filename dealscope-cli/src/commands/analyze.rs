//! Run the full pipeline over local profile documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use dealscope_core::{AnalysisRequest, AnalysisStatus, Orchestrator, SessionId};
use serde::Deserialize;
use tracing::warn;

use super::show::print_report;
use crate::config::ConfigLoader;

/// How often the session record is polled for progress
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Extracted profile documents (JSON)
    #[arg(required = true)]
    pub profiles: Vec<PathBuf>,

    /// Company name, when the documents do not carry one
    #[arg(long)]
    pub company: Option<String>,

    /// Owner recorded on the session
    #[arg(long)]
    pub owner: Option<String>,

    /// TOML file with dimension weights (top level or under [weights])
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeightsFile {
    Nested { weights: BTreeMap<String, f64> },
    Flat(BTreeMap<String, f64>),
}

fn read_weights(path: &Path) -> Result<BTreeMap<String, f64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: WeightsFile = toml::from_str(&contents)
        .with_context(|| format!("Invalid weights file {}", path.display()))?;
    Ok(match file {
        WeightsFile::Nested { weights } | WeightsFile::Flat(weights) => weights,
    })
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let orchestrator = super::orchestrator(&config).await?;

    let refs = args
        .profiles
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let mut request = AnalysisRequest::new(refs);
    if let Some(company) = args.company {
        request = request.with_company_name(company);
    }
    if let Some(owner) = args.owner {
        request = request.with_owner(owner);
    }
    if let Some(path) = &args.weights {
        request = request.with_weights(read_weights(path)?);
    }

    let (id, handle) = orchestrator.start_detached(request).await?;
    eprintln!("Started {id}");

    follow_progress(&orchestrator, &id, handle).await?;

    let report = orchestrator.get(id.as_str()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.session.status == AnalysisStatus::Failed {
        bail!(
            "Analysis {} failed: {}",
            id,
            report.session.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Print each progress change until the background run finishes.
async fn follow_progress(
    orchestrator: &Orchestrator,
    id: &SessionId,
    mut handle: tokio::task::JoinHandle<()>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut last_progress = None;

    loop {
        tokio::select! {
            joined = &mut handle => {
                joined.context("Analysis task panicked")?;
                return Ok(());
            }
            _ = ticker.tick() => {
                match orchestrator.session(id.as_str()).await {
                    Ok(session) if last_progress != Some(session.progress) => {
                        eprintln!("[{:>3}%] {}", session.progress, session.message);
                        last_progress = Some(session.progress);
                    }
                    Ok(_) => {}
                    Err(e) => warn!(session_id = %id, error = %e, "Progress poll failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_flat_weights() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.toml");
        std::fs::write(&path, "growth_potential = 0.5\nteam_quality = 0.5\n").unwrap();

        let weights = read_weights(&path).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights["growth_potential"], 0.5);
    }

    #[test]
    fn test_read_nested_weights() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.toml");
        std::fs::write(&path, "[weights]\ngrowth_potential = 0.4\nteam_quality = 0.6\n").unwrap();

        let weights = read_weights(&path).unwrap();
        assert_eq!(weights["team_quality"], 0.6);
    }

    #[test]
    fn test_read_weights_rejects_non_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.toml");
        std::fs::write(&path, "growth_potential = \"high\"\n").unwrap();

        assert!(read_weights(&path).is_err());
    }
}
