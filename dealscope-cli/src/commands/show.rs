//! Rendering of stored analyses.

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use dealscope_core::benchmark::BenchmarkResult;
use dealscope_core::risk::RiskSource;
use dealscope_core::scoring::WeightedScoreResult;
use dealscope_core::{AnalysisReport, AnalysisStatus, DealNoteOutcome, RiskAssessment};

use crate::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Session ID (analysis_...)
    pub session_id: String,

    /// Print the raw report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ShowArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let orchestrator = super::orchestrator(&config).await?;
    let report = orchestrator.get(&args.session_id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// Print every available section of a report.
pub fn print_report(report: &AnalysisReport) {
    let session = &report.session;
    println!("Session:  {}", session.id);
    println!(
        "Company:  {}",
        session.company_name.as_deref().unwrap_or("Unknown Company")
    );
    println!(
        "Status:   {} ({}%, {})",
        session.status, session.progress, session.message
    );
    if session.status == AnalysisStatus::Failed
        && let Some(error) = &session.error
    {
        println!("Error:    {error}");
    }

    if let Some(risk) = &report.risk_assessment {
        println!();
        print_risks(risk);
    }
    if let Some(benchmark) = &report.benchmark {
        println!();
        print_benchmark(benchmark);
    }
    if let Some(scores) = &report.weighted_scores {
        println!();
        print_scores(scores);
    }
    if let Some(note) = &report.deal_note {
        println!();
        print_deal_note(note);
    }
}

fn print_risks(risk: &RiskAssessment) {
    println!(
        "Risk assessment: {:.1}/10 overall, {} risks ({} high severity)",
        risk.overall_risk_score, risk.metadata.total_risks, risk.metadata.high_severity_risks
    );

    let mut table = new_table(&["Category", "Risk", "Severity", "Impact", "Source"]);
    for (category, items) in &risk.risks {
        for item in items {
            table.add_row(vec![
                Cell::new(category.title()),
                Cell::new(&item.risk_type),
                Cell::new(item.severity),
                Cell::new(item.impact),
                Cell::new(match item.source {
                    RiskSource::Ai => "ai",
                    RiskSource::Heuristic => "heuristic",
                }),
            ]);
        }
    }
    println!("{table}");

    for explanation in &risk.risk_explanations {
        println!("  - {explanation}");
    }
}

fn print_benchmark(benchmark: &BenchmarkResult) {
    println!(
        "Benchmark: {:.1}/100 (grade {}, {} metrics)",
        benchmark.overall_score.score,
        benchmark.overall_score.grade,
        benchmark.overall_score.metrics_count
    );

    let mut table = new_table(&["Metric", "Value", "Percentile", "Median", "Assessment"]);
    for ranked in benchmark.percentiles.values() {
        table.add_row(vec![
            Cell::new(ranked.metric),
            Cell::new(format!("{:.1}", ranked.value)),
            Cell::new(format!("{:.1}", ranked.percentile)),
            Cell::new(format!("{:.1}", ranked.benchmark_median)),
            Cell::new(&ranked.interpretation),
        ]);
    }
    println!("{table}");

    for insight in &benchmark.insights {
        println!("  - {}", insight.text);
    }
}

/// Dimension table plus the recommendation block.
pub fn print_scores(scores: &WeightedScoreResult) {
    let mut table = new_table(&["Dimension", "Score", "Weight"]);
    for (dimension, score) in scores.dimension_scores.iter() {
        table.add_row(vec![
            Cell::new(dimension.title()),
            Cell::new(format!("{score:.1}")),
            Cell::new(format!(
                "{:.0}%",
                scores.weights_applied.get(dimension) * 100.0
            )),
        ]);
    }
    println!("{table}");

    let recommendation = &scores.recommendation;
    println!(
        "Overall: {:.2}/10 -> {} ({}% confidence)",
        scores.overall_score, recommendation.tier, recommendation.confidence
    );
    for line in recommendation.rationale.lines() {
        println!("  {line}");
    }
    if !recommendation.strengths.is_empty() {
        println!("Strengths:");
        for strength in &recommendation.strengths {
            println!("  + {strength}");
        }
    }
    if !recommendation.concerns.is_empty() {
        println!("Concerns:");
        for concern in &recommendation.concerns {
            println!("  - {concern}");
        }
    }
}

fn print_deal_note(outcome: &DealNoteOutcome) {
    match outcome {
        DealNoteOutcome::Generated(note) => {
            println!(
                "Deal note ({} words, model {}):",
                note.word_count,
                note.model.as_deref().unwrap_or("unknown")
            );
            println!("{}", note.content);
        }
        DealNoteOutcome::Failed {
            details,
            fallback_summary,
            ..
        } => {
            println!("Deal note unavailable: {details}");
            println!("{fallback_summary}");
        }
    }
}
