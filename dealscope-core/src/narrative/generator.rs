//! Deal note generator with bounded retries.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use dealscope_models::providers::InferenceClient;
use dealscope_models::{ExpectedShape, GenerationRequest, GenerationResponse};

use super::types::{DealNote, DealNoteOutcome, SummaryStats};
use crate::benchmark::BenchmarkResult;
use crate::config::NarrativeConfig;
use crate::error::NarrativeError;
use crate::profile::StartupProfile;
use crate::risk::RiskAssessment;
use crate::scoring::WeightedScoreResult;

const PROFILE_EXCERPT_CHARS: usize = 1500;
const BENCHMARK_EXCERPT_CHARS: usize = 800;
const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length limits]";
const NOTE_SECTIONS: [(&str, &str); 10] = [
    ("EXECUTIVE SUMMARY", "3-4 sentences covering the opportunity, key strengths, and recommendation."),
    ("INVESTMENT THESIS", "3 bullet points with the main reasons to invest or pass."),
    ("KEY METRICS", "Financial highlights and important business metrics."),
    ("MARKET OPPORTUNITY", "Market size, growth potential, and competitive landscape."),
    ("TEAM ASSESSMENT", "Founder and team evaluation."),
    ("PRODUCT/TECHNOLOGY", "Product differentiation and development stage."),
    ("RISK FACTORS", "Top 3 risks with brief mitigation strategies."),
    ("BENCHMARKING INSIGHTS", "How this company compares to sector peers."),
    ("RECOMMENDATION", "Clear Pass/Consider/Pursue decision with a 2-3 sentence rationale."),
    ("NEXT STEPS", "3-5 specific actionable items for further due diligence."),
];

/// Everything a deal note is written from.
#[derive(Debug, Clone, Copy)]
pub struct DealNoteInput<'a> {
    pub profile: &'a StartupProfile,
    pub risk: &'a RiskAssessment,
    pub benchmark: &'a BenchmarkResult,
    pub scores: &'a WeightedScoreResult,
}

pub struct DealNoteGenerator {
    client: Arc<dyn InferenceClient>,
    config: NarrativeConfig,
}

impl DealNoteGenerator {
    pub fn new(client: Arc<dyn InferenceClient>, config: NarrativeConfig) -> Self {
        Self { client, config }
    }

    /// Generate a deal note, bounded by the configured retries and timeout.
    pub async fn generate(&self, input: DealNoteInput<'_>) -> Result<DealNote, NarrativeError> {
        if !self.config.enabled {
            return Err(NarrativeError::Disabled);
        }
        if !self.client.is_available() {
            return Err(NarrativeError::Unavailable(self.client.name().to_string()));
        }

        let prompt = build_prompt(input, self.config.max_prompt_chars);
        let response =
            match tokio::time::timeout(self.config.timeout(), self.generate_with_retries(prompt)).await {
                Ok(result) => result?,
                Err(_) => return Err(NarrativeError::Timeout(self.config.timeout_seconds)),
            };

        let content = response.text.trim().to_string();
        Ok(DealNote {
            generated_at: Utc::now(),
            company_name: input.profile.display_name().to_string(),
            recommendation: input.scores.recommendation.tier,
            overall_score: input.scores.overall_score,
            word_count: content.split_whitespace().count(),
            content,
            model: response.model.or_else(|| Some(self.client.name().to_string())),
            summary_stats: summary_stats(input),
        })
    }

    /// Like [`generate`](Self::generate), with failures folded into the outcome.
    pub async fn outcome(&self, input: DealNoteInput<'_>) -> DealNoteOutcome {
        match self.generate(input).await {
            Ok(note) => DealNoteOutcome::Generated(note),
            Err(err) => {
                tracing::warn!(error = %err, "deal note generation failed, storing fallback summary");
                DealNoteOutcome::Failed {
                    error: "Deal note generation failed".to_string(),
                    details: err.to_string(),
                    fallback_summary: fallback_summary(input),
                }
            }
        }
    }

    async fn generate_with_retries(
        &self,
        prompt: String,
    ) -> Result<GenerationResponse, NarrativeError> {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            let request = GenerationRequest::new(prompt.clone(), ExpectedShape::Text)
                .with_temperature(0.3)
                .with_max_tokens(2048);

            match self.client.generate(request).await {
                Ok(response) if !response.text.trim().is_empty() => return Ok(response),
                Ok(_) => last_error = "empty response from model".to_string(),
                Err(e) => last_error = e.to_string(),
            }

            tracing::warn!(attempt = attempt + 1, attempts, error = %last_error, "deal note attempt failed");
            if attempt + 1 < attempts {
                tokio::time::sleep(self.config.backoff(attempt)).await;
            }
        }

        Err(NarrativeError::RetriesExhausted {
            attempts,
            last_error,
        })
    }
}

fn summary_stats(input: DealNoteInput<'_>) -> SummaryStats {
    let profile = input.profile;
    SummaryStats {
        risk_score: input.risk.overall_risk_score,
        sector: profile.sector.clone(),
        stage: profile.stage.clone(),
        revenue: profile.financials.revenue,
        growth_rate: profile.financials.growth_rate,
        team_size: profile.team.size,
        funding_raised: profile.financials.funding_raised,
    }
}

fn build_prompt(input: DealNoteInput<'_>, max_chars: usize) -> String {
    let profile = input.profile;
    let name = profile.display_name();
    let risk_summary = input
        .risk
        .risk_explanations
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ");

    let mut prompt = format!(
        "Generate a professional investment deal note for {name} based on the analysis below.\n\n\
         COMPANY OVERVIEW:\n\
         - Name: {name}\n\
         - Sector: {sector}\n\
         - Stage: {stage}\n\
         - Overall Score: {score:.1}/10\n\
         - Recommendation: {tier}\n\n\
         STARTUP DATA (key metrics):\n{profile_json}\n\n\
         RISK ASSESSMENT:\n\
         - Overall Risk Score: {risk:.1}/10\n\
         - Key Risk Areas: {risk_summary}\n\n\
         BENCHMARKING RESULTS:\n{benchmark}\n\n\
         Please generate a structured deal note with these exact sections:\n\n",
        sector = profile.sector.as_deref().unwrap_or("Unknown"),
        stage = profile.stage.as_deref().unwrap_or("Unknown"),
        score = input.scores.overall_score,
        tier = input.scores.recommendation.tier,
        profile_json = json_excerpt(profile, PROFILE_EXCERPT_CHARS),
        risk = input.risk.overall_risk_score,
        benchmark = benchmark_excerpt(input.benchmark),
    );
    for (heading, guidance) in NOTE_SECTIONS {
        let _ = writeln!(prompt, "**{heading}**\n{guidance}\n");
    }
    prompt.push_str("Keep the total response under 1500 words. Be concise but comprehensive.");

    truncate_with_marker(prompt, max_chars)
}

/// Pretty JSON cut back to the last whole line within `max_chars`.
fn json_excerpt(profile: &StartupProfile, max_chars: usize) -> String {
    let json = match serde_json::to_string_pretty(profile) {
        Ok(json) => json,
        Err(e) => return format!("[Unable to serialize profile: {e}]"),
    };
    if json.chars().count() <= max_chars {
        return json;
    }
    let cut: String = json.chars().take(max_chars).collect();
    let cut = match cut.rfind('\n') {
        Some(newline) if newline > 0 => &cut[..newline],
        _ => cut.as_str(),
    };
    format!("{cut}\n  [... data truncated ...]")
}

fn benchmark_excerpt(benchmark: &BenchmarkResult) -> String {
    let mut text = format!(
        "Overall: {:.1}/100 (grade {})\n",
        benchmark.overall_score.score, benchmark.overall_score.grade
    );
    for p in benchmark.percentiles.values() {
        let _ = writeln!(
            text,
            "- {}: {} ({:.1}th percentile, {})",
            p.metric.as_str(),
            p.value,
            p.percentile,
            p.relative_performance
        );
    }
    text.chars().take(BENCHMARK_EXCERPT_CHARS).collect()
}

fn truncate_with_marker(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

fn or_undisclosed(value: Option<f64>) -> String {
    value.map_or_else(|| "Not disclosed".to_string(), |v| v.to_string())
}

/// Plain-text summary stored when generation fails.
pub fn fallback_summary(input: DealNoteInput<'_>) -> String {
    let profile = input.profile;
    let name = profile.display_name();
    let sector = profile.sector.as_deref().unwrap_or("Unknown");
    let stage = profile.stage.as_deref().unwrap_or("Unknown");
    let recommendation = &input.scores.recommendation;
    let score = input.scores.overall_score;
    let f = &profile.financials;

    format!(
        "**DEAL SUMMARY - {name}**\n\n\
         **EXECUTIVE SUMMARY**\n\
         {name} is a {sector} company in the {stage} stage. Based on our analysis, we recommend: {tier} (Score: {score:.1}/10).\n\n\
         **KEY INFORMATION**\n\
         • Sector: {sector}\n\
         • Stage: {stage}\n\
         • Overall Score: {score:.1}/10\n\
         • Recommendation: {tier}\n\
         • Team Size: {team}\n\
         • Revenue: {revenue}\n\
         • Growth Rate: {growth}\n\
         • Funding Raised: {raised}\n\n\
         **RECOMMENDATION RATIONALE**\n\
         {rationale}\n\n\
         **NOTE**\n\
         This is a basic summary generated without AI assistance. Review the risk assessment, \
         benchmark results and dimension scores for detail.\n\n\
         **NEXT STEPS**\n\
         1. Review detailed risk assessment\n\
         2. Compare benchmarking data with sector standards\n\
         3. Analyze financial projections and assumptions\n\
         4. Conduct team and market validation",
        tier = recommendation.tier,
        team = or_undisclosed(profile.team.size),
        revenue = or_undisclosed(f.revenue),
        growth = or_undisclosed(f.growth_rate),
        raised = or_undisclosed(f.funding_raised),
        rationale = recommendation.rationale,
    )
}
