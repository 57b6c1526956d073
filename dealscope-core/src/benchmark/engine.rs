//! Benchmark engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use dealscope_models::providers::InferenceClient;
use dealscope_models::{ExpectedShape, GenerationRequest};
use serde_json::Value;

use super::percentile::{overall, rank};
use super::types::{
    BenchmarkDistribution, BenchmarkMetric, BenchmarkPercentile, BenchmarkResult, DataSource,
    Insight, PercentilePoints, Sentiment,
};
use crate::fallback::FallbackAdapter;
use crate::profile::StartupProfile;

const MIN_INSIGHTS: usize = 3;
const MAX_INSIGHTS: usize = 5;

/// Distribution used when estimation is unavailable or unusable.
pub fn static_distribution() -> BenchmarkDistribution {
    BenchmarkDistribution(BTreeMap::from([
        (BenchmarkMetric::RevenueMultiple, PercentilePoints::new(1.0, 3.0, 6.0, 12.0, 25.0)),
        (BenchmarkMetric::GrowthRate, PercentilePoints::new(20.0, 50.0, 100.0, 200.0, 400.0)),
        (BenchmarkMetric::TeamSize, PercentilePoints::new(3.0, 8.0, 15.0, 30.0, 60.0)),
        (
            BenchmarkMetric::MonthlyBurn,
            PercentilePoints::new(15_000.0, 35_000.0, 75_000.0, 150_000.0, 300_000.0),
        ),
        (BenchmarkMetric::RunwayMonths, PercentilePoints::new(6.0, 12.0, 18.0, 24.0, 36.0)),
        (BenchmarkMetric::Valuation, PercentilePoints::new(2.0, 8.0, 20.0, 50.0, 150.0)),
    ]))
}

/// Profile value in the units the distributions use.
///
/// Valuation is in millions USD; the revenue metric is a valuation to
/// revenue multiple and needs both figures.
pub fn metric_value(metric: BenchmarkMetric, profile: &StartupProfile) -> Option<f64> {
    let f = &profile.financials;
    match metric {
        BenchmarkMetric::GrowthRate => f.growth_rate,
        BenchmarkMetric::TeamSize => profile.team.size,
        BenchmarkMetric::MonthlyBurn => f.burn_rate,
        BenchmarkMetric::RunwayMonths => f.effective_runway_months(),
        BenchmarkMetric::Valuation => f.valuation.map(|v| v / 1e6),
        BenchmarkMetric::RevenueMultiple => match (f.valuation, f.revenue) {
            (Some(valuation), Some(revenue)) if revenue > 0.0 => Some(valuation / revenue),
            _ => None,
        },
    }
}

/// Ranks a profile against sector distributions.
pub struct BenchmarkEngine {
    adapter: FallbackAdapter,
}

impl BenchmarkEngine {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            adapter: FallbackAdapter::new(client),
        }
    }

    pub async fn analyze(&self, profile: &StartupProfile) -> BenchmarkResult {
        let sourced = self
            .adapter
            .generate(distribution_request(profile), parse_distribution, static_distribution)
            .await;
        let data_source = if sourced.is_fallback() {
            DataSource::StaticFallback
        } else {
            DataSource::AiEstimate
        };
        let distribution = sourced.value;

        let percentiles: BTreeMap<BenchmarkMetric, BenchmarkPercentile> = BenchmarkMetric::ALL
            .into_iter()
            .filter_map(|metric| {
                let value = metric_value(metric, profile)?;
                let points = distribution.get(metric)?;
                Some((metric, rank(metric, value, points)))
            })
            .collect();
        let overall_score = overall(&percentiles);

        let insights = if self.adapter.is_available() {
            self.adapter
                .generate(insight_request(profile, &percentiles), parse_insights, Vec::new)
                .await
                .value
        } else {
            Vec::new()
        };

        tracing::debug!(
            metrics = percentiles.len(),
            score = overall_score.score,
            source = ?data_source,
            "benchmark analysis complete"
        );

        BenchmarkResult {
            percentiles,
            overall_score,
            distribution,
            insights,
            data_source,
            analysis_date: Utc::now(),
        }
    }
}

/// Keep every metric whose five points are numeric and ordered.
///
/// Invalid metrics are skipped, never defaulted. A payload with no valid
/// metric is rejected as a whole.
fn parse_distribution(payload: Value) -> Result<BenchmarkDistribution, String> {
    let Value::Object(map) = payload else {
        return Err("distribution payload is not an object".to_string());
    };

    let mut metrics = BTreeMap::new();
    for metric in BenchmarkMetric::ALL {
        let entry = map
            .get(metric.distribution_key())
            .or_else(|| map.get(metric.as_str()));
        match entry.and_then(parse_points) {
            Some(points) => {
                metrics.insert(metric, points);
            }
            None => tracing::debug!(%metric, "benchmark metric missing or malformed, skipped"),
        }
    }

    if metrics.is_empty() {
        return Err("no usable metric distributions".to_string());
    }
    Ok(BenchmarkDistribution(metrics))
}

fn parse_points(entry: &Value) -> Option<PercentilePoints> {
    let point = |key: &str| entry.get(key)?.as_f64().filter(|n| n.is_finite());
    let points = PercentilePoints::new(
        point("p10")?,
        point("p25")?,
        point("p50")?,
        point("p75")?,
        point("p90")?,
    );
    points
        .as_array()
        .windows(2)
        .all(|w| w[0] <= w[1])
        .then_some(points)
}

fn parse_insights(payload: Value) -> Result<Vec<Insight>, String> {
    let Value::Array(entries) = payload else {
        return Err("insights payload is not an array".to_string());
    };

    let mut insights: Vec<Insight> = entries.iter().filter_map(parse_insight).collect();
    if insights.len() < MIN_INSIGHTS {
        return Err(format!("expected at least {MIN_INSIGHTS} insights, got {}", insights.len()));
    }
    insights.truncate(MAX_INSIGHTS);
    Ok(insights)
}

fn parse_insight(entry: &Value) -> Option<Insight> {
    let (text, sentiment) = match entry {
        Value::String(s) => (s.as_str(), Sentiment::Neutral),
        Value::Object(obj) => {
            let text = obj.get("text").or_else(|| obj.get("insight"))?.as_str()?;
            let sentiment = match obj.get("sentiment").and_then(Value::as_str).map(str::to_lowercase) {
                Some(s) if s.starts_with("pos") => Sentiment::Positive,
                Some(s) if s.starts_with("neg") => Sentiment::Negative,
                _ => Sentiment::Neutral,
            };
            (text, sentiment)
        }
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| Insight {
        text: text.to_string(),
        sentiment,
    })
}

fn distribution_request(profile: &StartupProfile) -> GenerationRequest {
    let sector = profile.sector.as_deref().unwrap_or("technology");
    let geography = profile.geography.as_deref().unwrap_or("US");
    let stage = profile
        .stage
        .as_deref()
        .map(|s| format!(" for {s} stage companies"))
        .unwrap_or_default();

    let keys = BenchmarkMetric::ALL
        .iter()
        .map(|m| format!("\"{}\": {{\"p10\": n, \"p25\": n, \"p50\": n, \"p75\": n, \"p90\": n}}", m.distribution_key()))
        .collect::<Vec<_>>()
        .join(",\n  ");

    let prompt = format!(
        "Estimate startup benchmark distributions for the {sector} sector in {geography}{stage}.\n\
         Return only a JSON object of this form with numeric values:\n{{\n  {keys}\n}}\n\
         Growth rates are annual percentages. Burn rates are USD per month. Team sizes are \
         employee counts. Runway is in months. Valuations are millions of USD. Revenue multiples \
         are valuation divided by annual revenue."
    );
    GenerationRequest::new(prompt, ExpectedShape::Object).with_temperature(0.2)
}

fn insight_request(
    profile: &StartupProfile,
    percentiles: &BTreeMap<BenchmarkMetric, BenchmarkPercentile>,
) -> GenerationRequest {
    let names = |keep: fn(f64) -> bool| {
        percentiles
            .values()
            .filter(|p| keep(p.percentile))
            .map(|p| p.metric.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let strong = names(|p| p >= 75.0);
    let weak = names(|p| p < 40.0);

    let prompt = format!(
        "Analyze this {sector} startup's benchmark performance and give 3 to 5 specific, actionable insights.\n\
         Strong areas (75th percentile and above): [{strong}]\n\
         Weak areas (below 40th percentile): [{weak}]\n\
         Company stage: {stage}\n\
         Return only a JSON array of objects: [{{\"text\": \"...\", \"sentiment\": \"positive|negative|neutral\"}}]",
        sector = profile.sector.as_deref().unwrap_or("technology"),
        stage = profile.stage.as_deref().unwrap_or("unknown"),
    );
    GenerationRequest::new(prompt, ExpectedShape::Array).with_temperature(0.4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::testing::ScriptedClient;
    use crate::profile::Financials;
    use dealscope_models::providers::DisabledClient;
    use serde_json::json;

    fn profile() -> StartupProfile {
        StartupProfile {
            sector: Some("fintech".to_string()),
            financials: Financials {
                growth_rate: Some(43.0),
                burn_rate: Some(16_867.0),
                runway_months: Some(6.0),
                revenue: Some(400_000.0),
                valuation: Some(4_000_000.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn malformed_metric_is_skipped_not_defaulted() {
        let payload = json!({
            "growth_rates": {"p10": 10, "p25": 30, "p50": 60, "p75": 120, "p90": 250},
            "team_sizes": {"p10": 2, "p25": "eight", "p50": 15, "p75": 30, "p90": 60},
            "runway_months": {"p10": 6, "p25": 12, "p50": 18, "p75": 24},
        });
        let distribution = parse_distribution(payload).unwrap();

        assert_eq!(distribution.len(), 1);
        assert!(distribution.get(BenchmarkMetric::GrowthRate).is_some());
        assert!(distribution.get(BenchmarkMetric::TeamSize).is_none());
        assert!(distribution.get(BenchmarkMetric::RunwayMonths).is_none());
    }

    #[test]
    fn unordered_points_are_rejected() {
        let payload = json!({"growth_rates": {"p10": 90, "p25": 30, "p50": 60, "p75": 120, "p90": 250}});
        assert!(parse_distribution(payload).is_err());
    }

    #[test]
    fn insights_accept_strings_and_objects() {
        let insights = parse_insights(json!([
            "Burn is efficient for the stage",
            {"text": "Growth trails peers", "sentiment": "negative"},
            {"insight": "Runway is short", "sentiment": "Negative"},
            {"text": "Valuation is modest", "sentiment": "positive"},
            42,
        ]))
        .unwrap();

        assert_eq!(insights.len(), 4);
        assert_eq!(insights[0].sentiment, Sentiment::Neutral);
        assert_eq!(insights[2].sentiment, Sentiment::Negative);
        assert_eq!(insights[3].sentiment, Sentiment::Positive);
    }

    #[test]
    fn too_few_insights_are_rejected() {
        assert!(parse_insights(json!(["only one", "two"])).is_err());
    }

    #[test]
    fn metric_values_use_distribution_units() {
        let p = profile();
        assert_eq!(metric_value(BenchmarkMetric::Valuation, &p), Some(4.0));
        assert_eq!(metric_value(BenchmarkMetric::RevenueMultiple, &p), Some(10.0));
        assert_eq!(metric_value(BenchmarkMetric::TeamSize, &p), None);
    }

    #[tokio::test]
    async fn unavailable_client_uses_static_table_without_insights() {
        let engine = BenchmarkEngine::new(Arc::new(DisabledClient));
        let result = engine.analyze(&profile()).await;

        assert_eq!(result.data_source, DataSource::StaticFallback);
        assert_eq!(result.distribution, static_distribution());
        assert!(result.insights.is_empty());

        let growth = &result.percentiles[&BenchmarkMetric::GrowthRate];
        assert_eq!(growth.percentile, 17.5);
        assert_eq!(growth.relative_performance, "Below median");

        // 16,867 <= p25 (35,000) → 17.5, inverted to 82.5.
        assert_eq!(result.percentiles[&BenchmarkMetric::MonthlyBurn].percentile, 82.5);
        assert!(!result.percentiles.contains_key(&BenchmarkMetric::TeamSize));
        assert_eq!(result.overall_score.metrics_count, 5);
    }

    #[tokio::test]
    async fn ai_distribution_and_insights_are_used() {
        let client = ScriptedClient::with_responses([
            r#"```json
            {"growth_rates": {"p10": 5, "p25": 10, "p50": 20, "p75": 40, "p90": 80}}
            ```"#,
            r#"["Growth is top decile", "Burn is unbenchmarked", "Add team data"]"#,
        ]);
        let engine = BenchmarkEngine::new(Arc::new(client));
        let result = engine.analyze(&profile()).await;

        assert_eq!(result.data_source, DataSource::AiEstimate);
        assert_eq!(result.percentiles.len(), 1);
        assert_eq!(result.percentiles[&BenchmarkMetric::GrowthRate].percentile, 82.5);
        assert_eq!(result.insights.len(), 3);
    }

    #[tokio::test]
    async fn insight_failure_yields_empty_list() {
        let client = ScriptedClient::with_responses(["not json at all"]);
        let engine = BenchmarkEngine::new(Arc::new(client));
        let result = engine.analyze(&profile()).await;

        assert_eq!(result.data_source, DataSource::StaticFallback);
        assert!(result.insights.is_empty());
    }
}
