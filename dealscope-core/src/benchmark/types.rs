//! Benchmark data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metrics compared against sector distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkMetric {
    #[serde(rename = "growth_rate")]
    GrowthRate,
    #[serde(rename = "team_size")]
    TeamSize,
    #[serde(rename = "burn_rate")]
    MonthlyBurn,
    #[serde(rename = "runway")]
    RunwayMonths,
    #[serde(rename = "valuation")]
    Valuation,
    #[serde(rename = "revenue")]
    RevenueMultiple,
}

impl BenchmarkMetric {
    pub const ALL: [BenchmarkMetric; 6] = [
        BenchmarkMetric::GrowthRate,
        BenchmarkMetric::TeamSize,
        BenchmarkMetric::MonthlyBurn,
        BenchmarkMetric::RunwayMonths,
        BenchmarkMetric::Valuation,
        BenchmarkMetric::RevenueMultiple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BenchmarkMetric::GrowthRate => "growth_rate",
            BenchmarkMetric::TeamSize => "team_size",
            BenchmarkMetric::MonthlyBurn => "burn_rate",
            BenchmarkMetric::RunwayMonths => "runway",
            BenchmarkMetric::Valuation => "valuation",
            BenchmarkMetric::RevenueMultiple => "revenue",
        }
    }

    /// Key of this metric's distribution in an estimation payload.
    pub fn distribution_key(self) -> &'static str {
        match self {
            BenchmarkMetric::GrowthRate => "growth_rates",
            BenchmarkMetric::TeamSize => "team_sizes",
            BenchmarkMetric::MonthlyBurn => "burn_rates_monthly",
            BenchmarkMetric::RunwayMonths => "runway_months",
            BenchmarkMetric::Valuation => "valuation_millions",
            BenchmarkMetric::RevenueMultiple => "revenue_multiples",
        }
    }

    /// Only burn rate is better when lower.
    pub fn lower_is_better(self) -> bool {
        matches!(self, BenchmarkMetric::MonthlyBurn)
    }

    /// Share in the overall benchmark score before renormalization.
    pub fn weight(self) -> f64 {
        match self {
            BenchmarkMetric::GrowthRate => 0.25,
            BenchmarkMetric::TeamSize => 0.15,
            BenchmarkMetric::MonthlyBurn => 0.20,
            BenchmarkMetric::RunwayMonths => 0.15,
            BenchmarkMetric::Valuation => 0.15,
            BenchmarkMetric::RevenueMultiple => 0.10,
        }
    }
}

impl fmt::Display for BenchmarkMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// p10/p25/p50/p75/p90 points of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentilePoints {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl PercentilePoints {
    pub const fn new(p10: f64, p25: f64, p50: f64, p75: f64, p90: f64) -> Self {
        Self { p10, p25, p50, p75, p90 }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.p10, self.p25, self.p50, self.p75, self.p90]
    }
}

/// Distributions keyed by metric; metrics may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkDistribution(pub BTreeMap<BenchmarkMetric, PercentilePoints>);

impl BenchmarkDistribution {
    pub fn get(&self, metric: BenchmarkMetric) -> Option<&PercentilePoints> {
        self.0.get(&metric)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where the distribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    AiEstimate,
    StaticFallback,
}

/// Ranking of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPercentile {
    pub metric: BenchmarkMetric,
    pub value: f64,
    /// One of 5, 17.5, 37.5, 62.5, 82.5, 95 (inverted when lower is better).
    pub percentile: f64,
    pub interpretation: String,
    pub relative_performance: String,
    pub benchmark_median: f64,
    pub benchmark_top_quartile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallBenchmark {
    /// 0 to 100, one decimal.
    pub score: f64,
    /// A to F, or "N/A" when nothing could be compared.
    pub grade: String,
    pub metrics_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub percentiles: BTreeMap<BenchmarkMetric, BenchmarkPercentile>,
    pub overall_score: OverallBenchmark,
    pub distribution: BenchmarkDistribution,
    pub insights: Vec<Insight>,
    pub data_source: DataSource,
    pub analysis_date: DateTime<Utc>,
}
