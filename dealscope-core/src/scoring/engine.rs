//! Weighted scoring.
//!
//! Pure functions of the profile, the risk assessment, and the benchmark
//! result. Nothing here touches the AI client or the store, so a reweight
//! can recompute scores from persisted inputs alone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dimensions::{DimensionScores, clamp_score};
use super::recommendation::Recommendation;
use super::weights::DimensionWeights;
use crate::benchmark::BenchmarkResult;
use crate::error::ValidationError;
use crate::profile::StartupProfile;
use crate::risk::{RiskAssessment, round2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedScoreResult {
    /// Weighted sum of dimension scores, 1 to 10.
    pub overall_score: f64,
    pub dimension_scores: DimensionScores,
    pub weights_applied: DimensionWeights,
    pub recommendation: Recommendation,
    /// `(10 - overall_risk_score) / 10`. Reported only, never applied.
    pub risk_penalty: f64,
}

/// Score a profile with already validated weights.
pub fn score(
    profile: &StartupProfile,
    risk: &RiskAssessment,
    benchmark: &BenchmarkResult,
    weights: &DimensionWeights,
) -> WeightedScoreResult {
    let dimension_scores = DimensionScores::compute(profile, benchmark);
    // Tier thresholds apply to the exact sum; only the stored score is rounded.
    let exact_score = weighted_sum(&dimension_scores, weights);
    let overall_score = round2(exact_score);
    let risk_penalty = round2((10.0 - risk.overall_risk_score) / 10.0);

    tracing::debug!(overall_score, risk_penalty, "weighted score computed");

    WeightedScoreResult {
        recommendation: Recommendation::build(
            exact_score,
            &dimension_scores,
            weights,
            risk.overall_risk_score,
            &risk.risk_explanations,
        ),
        overall_score,
        dimension_scores,
        weights_applied: *weights,
        risk_penalty,
    }
}

/// Validate a raw weight map, then score. Invalid weights score nothing.
pub fn score_with_weights(
    profile: &StartupProfile,
    risk: &RiskAssessment,
    benchmark: &BenchmarkResult,
    raw_weights: &BTreeMap<String, f64>,
) -> Result<WeightedScoreResult, ValidationError> {
    let weights = DimensionWeights::from_map(raw_weights)?;
    Ok(score(profile, risk, benchmark, &weights))
}

/// Σ score × weight, clamped to `[1, 10]`.
pub fn weighted_sum(scores: &DimensionScores, weights: &DimensionWeights) -> f64 {
    let total: f64 = scores.iter().map(|(d, s)| s * weights.get(d)).sum();
    clamp_score(total)
}

/// [`weighted_sum`] rounded to two decimals, as reported.
pub fn combine(scores: &DimensionScores, weights: &DimensionWeights) -> f64 {
    round2(weighted_sum(scores, weights))
}
