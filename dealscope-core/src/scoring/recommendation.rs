//! Recommendation tiers and rationale text.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dimensions::DimensionScores;
use super::weights::{Dimension, DimensionWeights};

const PURSUE_THRESHOLD: f64 = 7.5;
const CONSIDER_THRESHOLD: f64 = 6.0;
const STRENGTH_THRESHOLD: f64 = 7.0;
const MAX_STRENGTHS: usize = 3;
const MAX_CONCERNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Pass,
    Consider,
    Pursue,
}

impl Tier {
    /// Tier for an overall weighted score.
    pub fn for_score(score: f64) -> Self {
        if score >= PURSUE_THRESHOLD {
            Tier::Pursue
        } else if score >= CONSIDER_THRESHOLD {
            Tier::Consider
        } else {
            Tier::Pass
        }
    }

    /// Fixed confidence percentage per tier.
    pub fn confidence(self) -> u8 {
        match self {
            Tier::Pursue => 85,
            Tier::Consider => 65,
            Tier::Pass => 45,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Pass => "PASS",
            Tier::Consider => "CONSIDER",
            Tier::Pursue => "PURSUE",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: Tier,
    pub confidence: u8,
    pub rationale: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl Recommendation {
    pub(crate) fn build(
        overall_score: f64,
        scores: &DimensionScores,
        weights: &DimensionWeights,
        overall_risk_score: f64,
        risk_explanations: &[String],
    ) -> Self {
        let tier = Tier::for_score(overall_score);
        let confidence = tier.confidence();
        Self {
            rationale: rationale(tier, confidence, overall_score, scores, weights, overall_risk_score),
            strengths: strengths(scores, weights),
            concerns: risk_explanations.iter().take(MAX_CONCERNS).cloned().collect(),
            tier,
            confidence,
        }
    }
}

/// Dimensions sorted by descending weight; ties keep declaration order.
fn by_weight(weights: &DimensionWeights) -> Vec<(Dimension, f64)> {
    let mut ranked: Vec<_> = weights.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

fn rationale(
    tier: Tier,
    confidence: u8,
    overall_score: f64,
    scores: &DimensionScores,
    weights: &DimensionWeights,
    overall_risk_score: f64,
) -> String {
    let mut lines = vec![format!(
        "Recommendation: {tier} (Score: {overall_score:.1}/10, Confidence: {confidence}%)"
    )];
    for (dimension, weight) in by_weight(weights).into_iter().take(2) {
        lines.push(format!(
            "{}: {:.0}% weight → {:.1}/10 score",
            dimension.title(),
            weight * 100.0,
            scores.get(dimension)
        ));
    }
    lines.push(format!("Risk Impact: {overall_risk_score:.1}/10 risk score"));
    lines.join("\n")
}

/// Up to three dimensions scoring at least 7, ordered by weighted contribution.
fn strengths(scores: &DimensionScores, weights: &DimensionWeights) -> Vec<String> {
    let mut strong: Vec<(Dimension, f64, f64)> = scores
        .iter()
        .filter(|(_, score)| *score >= STRENGTH_THRESHOLD)
        .map(|(d, score)| (d, score, score * weights.get(d)))
        .collect();
    strong.sort_by(|a, b| b.2.total_cmp(&a.2));

    strong
        .into_iter()
        .take(MAX_STRENGTHS)
        .map(|(d, score, _)| format!("Strong {}: {score:.1}/10", d.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(Tier::for_score(7.5), Tier::Pursue);
        assert_eq!(Tier::for_score(7.49), Tier::Consider);
        assert_eq!(Tier::for_score(6.0), Tier::Consider);
        assert_eq!(Tier::for_score(5.99), Tier::Pass);
        assert_eq!(Tier::Pursue.confidence(), 85);
        assert_eq!(Tier::Consider.confidence(), 65);
        assert_eq!(Tier::Pass.confidence(), 45);
    }

    #[test]
    fn tier_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Tier::Consider).unwrap(), "\"CONSIDER\"");
    }

    #[test]
    fn strengths_require_score_of_seven() {
        let mut scores = DimensionScores::uniform(5.0);
        scores.team_quality = 9.0;
        scores.financial_metrics = 7.0;
        scores.market_opportunity = 6.9;

        let found = strengths(&scores, &DimensionWeights::default());
        assert_eq!(found, vec!["Strong team quality: 9.0/10", "Strong financial metrics: 7.0/10"]);
    }

    #[test]
    fn strengths_capped_at_three_by_weighted_score() {
        let scores = DimensionScores::uniform(8.0);
        let found = strengths(&scores, &DimensionWeights::default());
        assert_eq!(
            found,
            vec![
                "Strong growth potential: 8.0/10",
                "Strong market opportunity: 8.0/10",
                "Strong team quality: 8.0/10",
            ]
        );
    }

    #[test]
    fn rationale_cites_top_weights_and_risk() {
        let scores = DimensionScores::uniform(6.0);
        let text = rationale(Tier::Consider, 65, 6.0, &scores, &DimensionWeights::default(), 4.3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Recommendation: CONSIDER (Score: 6.0/10, Confidence: 65%)");
        assert_eq!(lines[1], "Growth Potential: 25% weight → 6.0/10 score");
        assert_eq!(lines[2], "Market Opportunity: 20% weight → 6.0/10 score");
        assert_eq!(lines[3], "Risk Impact: 4.3/10 risk score");
    }

    #[test]
    fn concerns_take_first_three_explanations() {
        let explanations: Vec<String> = (1..=5).map(|i| format!("risk {i}")).collect();
        let rec = Recommendation::build(
            5.0,
            &DimensionScores::uniform(5.0),
            &DimensionWeights::default(),
            6.0,
            &explanations,
        );
        assert_eq!(rec.tier, Tier::Pass);
        assert_eq!(rec.concerns, vec!["risk 1", "risk 2", "risk 3"]);
        assert!(rec.strengths.is_empty());
    }
}
