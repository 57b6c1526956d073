//! Per-dimension scoring rules.
//!
//! Every score starts from a base, adds or subtracts fixed increments, and
//! is clamped to `[1, 10]`. Absent profile fields never add points.

use serde::{Deserialize, Serialize};

use super::weights::Dimension;
use crate::benchmark::{BenchmarkMetric, BenchmarkResult};
use crate::profile::{StartupProfile, text_len};

const BASE: f64 = 5.0;

/// Scores for the six dimensions, each in `[1, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub growth_potential: f64,
    pub market_opportunity: f64,
    pub team_quality: f64,
    pub product_technology: f64,
    pub financial_metrics: f64,
    pub competitive_position: f64,
}

impl DimensionScores {
    pub fn compute(profile: &StartupProfile, benchmark: &BenchmarkResult) -> Self {
        Self {
            growth_potential: growth_potential(profile, benchmark),
            market_opportunity: market_opportunity(profile),
            team_quality: team_quality(profile),
            product_technology: product_technology(profile),
            financial_metrics: financial_metrics(profile),
            competitive_position: competitive_position(profile),
        }
    }

    /// Same score for every dimension.
    pub fn uniform(score: f64) -> Self {
        let score = clamp_score(score);
        Self {
            growth_potential: score,
            market_opportunity: score,
            team_quality: score,
            product_technology: score,
            financial_metrics: score,
            competitive_position: score,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::GrowthPotential => self.growth_potential,
            Dimension::MarketOpportunity => self.market_opportunity,
            Dimension::TeamQuality => self.team_quality,
            Dimension::ProductTechnology => self.product_technology,
            Dimension::FinancialMetrics => self.financial_metrics,
            Dimension::CompetitivePosition => self.competitive_position,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    score.clamp(1.0, 10.0)
}

fn growth_potential(profile: &StartupProfile, benchmark: &BenchmarkResult) -> f64 {
    if profile.financials.growth_rate.is_none_or(|g| g == 0.0) {
        return 3.0;
    }
    let percentile = benchmark
        .percentiles
        .get(&BenchmarkMetric::GrowthRate)
        .map_or(50.0, |p| p.percentile);

    if percentile >= 90.0 {
        9.5
    } else if percentile >= 75.0 {
        8.0
    } else if percentile >= 50.0 {
        6.5
    } else if percentile >= 25.0 {
        4.5
    } else {
        2.5
    }
}

fn market_opportunity(profile: &StartupProfile) -> f64 {
    let market = &profile.market;
    let mut score = BASE;

    match market.size {
        Some(size) if size > 10e9 => score += 2.0,
        Some(size) if size > 1e9 => score += 1.0,
        _ => {}
    }
    if text_len(market.target_segment.as_deref()) > 50 {
        score += 1.0;
    }
    match market.competitors.len() {
        1..=5 => score += 1.0,
        n if n > 10 => score -= 1.0,
        _ => {}
    }
    clamp_score(score)
}

fn team_quality(profile: &StartupProfile) -> f64 {
    let mut score = BASE;

    if let Some(size) = profile.team.size {
        let in_band = match profile.normalized_stage().as_str() {
            "seed" => (3.0..=10.0).contains(&size),
            "series_a" => (8.0..=25.0).contains(&size),
            _ => false,
        };
        if in_band {
            score += 1.5;
        }
    }
    match profile.team.founders.len() {
        2 => score += 1.5,
        3 => score += 1.0,
        1 => score -= 1.0,
        _ => {}
    }
    clamp_score(score)
}

fn product_technology(profile: &StartupProfile) -> f64 {
    let product = &profile.product;
    let mut score = BASE;

    if text_len(product.description.as_deref()) > 100 {
        score += 1.0;
    }
    match text_len(product.competitive_advantage.as_deref()) {
        n if n > 50 => score += 2.0,
        n if n > 20 => score += 1.0,
        _ => {}
    }
    let stage = product.stage.as_deref().unwrap_or_default().to_lowercase();
    if stage.contains("mvp") || stage.contains("beta") {
        score += 1.0;
    } else if stage.contains("production") {
        score += 2.0;
    }
    clamp_score(score)
}

fn financial_metrics(profile: &StartupProfile) -> f64 {
    let f = &profile.financials;
    let mut score = BASE;

    match f.revenue {
        Some(r) if r > 1_000_000.0 => score += 2.0,
        Some(r) if r > 100_000.0 => score += 1.0,
        _ => {}
    }
    match f.growth_rate {
        Some(g) if g > 100.0 => score += 2.0,
        Some(g) if g > 50.0 => score += 1.0,
        _ => {}
    }
    clamp_score(score)
}

fn competitive_position(profile: &StartupProfile) -> f64 {
    let mut score = BASE;

    match profile.market.competitors.len() {
        0 => score -= 2.0,
        2..=5 => score += 1.5,
        n if n > 10 => score -= 1.0,
        _ => {}
    }
    match text_len(profile.product.competitive_advantage.as_deref()) {
        n if n > 100 => score += 2.0,
        n if n > 50 => score += 1.0,
        _ => {}
    }
    clamp_score(score)
}
