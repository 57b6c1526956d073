//! Percentile bucketing and grading.

use std::collections::BTreeMap;

use super::types::{BenchmarkMetric, BenchmarkPercentile, OverallBenchmark, PercentilePoints};

/// Bucket a raw value against a distribution.
///
/// `<= p10` → 5, `<= p25` → 17.5, `<= p50` → 37.5, `<= p75` → 62.5,
/// `<= p90` → 82.5, otherwise 95.
pub fn bucket(value: f64, points: &PercentilePoints) -> f64 {
    const BUCKETS: [f64; 5] = [5.0, 17.5, 37.5, 62.5, 82.5];
    points
        .as_array()
        .iter()
        .zip(BUCKETS)
        .find(|(point, _)| value <= **point)
        .map_or(95.0, |(_, bucket)| bucket)
}

/// Bucket adjusted for metric direction.
pub fn percentile_for(metric: BenchmarkMetric, value: f64, points: &PercentilePoints) -> f64 {
    let raw = bucket(value, points);
    if metric.lower_is_better() { 100.0 - raw } else { raw }
}

pub fn interpret(percentile: f64) -> &'static str {
    if percentile >= 80.0 {
        "Excellent - Top 20% performance"
    } else if percentile >= 60.0 {
        "Above Average - Top 40% performance"
    } else if percentile >= 40.0 {
        "Average - Typical performance"
    } else if percentile >= 20.0 {
        "Below Average - Bottom 40% performance"
    } else {
        "Poor - Bottom 20% performance"
    }
}

/// Phrase comparing the raw value with the median.
///
/// For burn rate a lower ratio is favorable and is phrased as "better".
pub fn relative_performance(metric: BenchmarkMetric, value: f64, median: f64) -> &'static str {
    if median == 0.0 {
        return "Unable to compare";
    }
    let ratio = value / median;
    if metric.lower_is_better() {
        if ratio <= 0.7 {
            "Significantly better than median"
        } else if ratio <= 0.9 {
            "Better than median"
        } else if ratio <= 1.1 {
            "Close to median"
        } else {
            "Worse than median"
        }
    } else if ratio >= 1.5 {
        "Significantly above median"
    } else if ratio >= 1.2 {
        "Above median"
    } else if ratio >= 0.8 {
        "Close to median"
    } else {
        "Below median"
    }
}

pub fn rank(metric: BenchmarkMetric, value: f64, points: &PercentilePoints) -> BenchmarkPercentile {
    let percentile = percentile_for(metric, value, points);
    BenchmarkPercentile {
        metric,
        value,
        percentile,
        interpretation: interpret(percentile).to_string(),
        relative_performance: relative_performance(metric, value, points.p50).to_string(),
        benchmark_median: points.p50,
        benchmark_top_quartile: points.p75,
    }
}

pub fn grade(score: f64) -> &'static str {
    if score >= 80.0 {
        "A"
    } else if score >= 65.0 {
        "B"
    } else if score >= 50.0 {
        "C"
    } else if score >= 35.0 {
        "D"
    } else {
        "F"
    }
}

/// Weighted mean of available percentiles, weights renormalized.
pub fn overall(percentiles: &BTreeMap<BenchmarkMetric, BenchmarkPercentile>) -> OverallBenchmark {
    let total_weight: f64 = percentiles.keys().map(|m| m.weight()).sum();
    if percentiles.is_empty() || total_weight <= 0.0 {
        return OverallBenchmark {
            score: 0.0,
            grade: "N/A".to_string(),
            metrics_count: 0,
        };
    }

    let weighted: f64 = percentiles
        .iter()
        .map(|(metric, p)| p.percentile * metric.weight())
        .sum();
    let score = ((weighted / total_weight) * 10.0).round() / 10.0;

    OverallBenchmark {
        score,
        grade: grade(score).to_string(),
        metrics_count: percentiles.len(),
    }
}
