//! Recompute scores of a completed analysis without rerunning the pipeline.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;

use super::show::print_scores;
use crate::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ReweightArgs {
    /// Session ID (analysis_...)
    pub session_id: String,

    /// Dimension weight as name=value; all six dimensions are required
    #[arg(long = "weight", short = 'w', value_name = "NAME=VALUE", value_parser = parse_weight, required = true)]
    pub weights: Vec<(String, f64)>,

    /// Print the new scores as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.trim().to_string(), value))
}

pub async fn run(args: ReweightArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let orchestrator = super::orchestrator(&config).await?;

    let weights: BTreeMap<String, f64> = args.weights.into_iter().collect();
    let scores = orchestrator.reweight(&args.session_id, &weights).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
    } else {
        print_scores(&scores);
    }
    Ok(())
}
