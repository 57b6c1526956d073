//! Sector benchmarking.
//!
//! Ranks profile metrics into percentile buckets against a sector
//! distribution estimated by the AI client, or a static table when the
//! estimate is unusable.

mod engine;
mod percentile;
mod types;

pub use engine::{BenchmarkEngine, metric_value, static_distribution};
pub use percentile::{bucket, grade, interpret, overall, percentile_for, rank, relative_performance};
pub use types::{
    BenchmarkDistribution, BenchmarkMetric, BenchmarkPercentile, BenchmarkResult, DataSource,
    Insight, OverallBenchmark, PercentilePoints, Sentiment,
};
