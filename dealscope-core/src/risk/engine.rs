//! Risk assessment engine.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dealscope_models::providers::InferenceClient;
use dealscope_models::{ExpectedShape, GenerationRequest};
use serde_json::Value;

use super::aggregate;
use super::dedup::deduplicate;
use super::heuristics::{MAX_RISKS_PER_CATEGORY, MIN_RISKS_PER_CATEGORY, fallback_risks};
use super::types::{Impact, Likelihood, RiskAssessment, RiskCategory, RiskItem, RiskSource};
use crate::fallback::FallbackAdapter;
use crate::profile::{StartupProfile, parse_number};

/// Profile JSON sent to the model is cut to this many characters.
const MAX_PROFILE_CHARS: usize = 4000;

/// Produces a [`RiskAssessment`] for a profile.
///
/// Each category is tried against the AI client first. Valid AI items are
/// topped up from the deterministic heuristics when fewer than three
/// survive validation; a failed AI call falls back to heuristics entirely.
pub struct RiskEngine {
    adapter: FallbackAdapter,
}

impl RiskEngine {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            adapter: FallbackAdapter::new(client),
        }
    }

    /// Assess all five categories concurrently, then deduplicate and aggregate.
    pub async fn assess(&self, profile: &StartupProfile) -> RiskAssessment {
        let profile_json = profile_excerpt(profile);

        let (financial, market, team, product, operational) = tokio::join!(
            self.category_risks(RiskCategory::Financial, profile, &profile_json),
            self.category_risks(RiskCategory::Market, profile, &profile_json),
            self.category_risks(RiskCategory::Team, profile, &profile_json),
            self.category_risks(RiskCategory::Product, profile, &profile_json),
            self.category_risks(RiskCategory::Operational, profile, &profile_json),
        );

        let risks = deduplicate(BTreeMap::from([
            (RiskCategory::Financial, financial),
            (RiskCategory::Market, market),
            (RiskCategory::Team, team),
            (RiskCategory::Product, product),
            (RiskCategory::Operational, operational),
        ]));

        aggregate::assemble(risks)
    }

    async fn category_risks(
        &self,
        category: RiskCategory,
        profile: &StartupProfile,
        profile_json: &str,
    ) -> Vec<RiskItem> {
        let request = GenerationRequest::new(prompt(category, profile_json), ExpectedShape::Array)
            .with_temperature(0.2);

        let ai_items = match self
            .adapter
            .attempt(request, |payload| parse_ai_risks(category, payload))
            .await
        {
            Ok(items) => items,
            Err(reason) => {
                tracing::warn!(%category, %reason, "AI risk analysis failed, using heuristics");
                return fallback_risks(category, profile);
            }
        };

        if ai_items.len() >= MIN_RISKS_PER_CATEGORY {
            tracing::info!(%category, count = ai_items.len(), "AI risk analysis succeeded");
            let mut items = ai_items;
            items.truncate(MAX_RISKS_PER_CATEGORY);
            return items;
        }

        tracing::warn!(%category, count = ai_items.len(), "too few AI risks, supplementing with heuristics");
        supplement(ai_items, fallback_risks(category, profile))
    }
}

/// Append heuristic items with unseen types until the minimum is met.
fn supplement(mut items: Vec<RiskItem>, fallback: Vec<RiskItem>) -> Vec<RiskItem> {
    let mut seen: HashSet<String> = items.iter().map(RiskItem::normalized_type).collect();
    for candidate in fallback {
        if items.len() >= MIN_RISKS_PER_CATEGORY {
            break;
        }
        if seen.insert(candidate.normalized_type()) {
            items.push(candidate);
        }
    }
    items
}

/// Validate a model-produced array of risks.
///
/// Entries missing `type`, `severity` or `details` are discarded. Severity is
/// rounded and clamped into 1..=10; impact defaults to medium.
fn parse_ai_risks(category: RiskCategory, payload: Value) -> Result<Vec<RiskItem>, String> {
    let Value::Array(entries) = payload else {
        return Err("risk payload is not an array".to_string());
    };

    Ok(entries
        .iter()
        .filter_map(|entry| parse_ai_risk(category, entry))
        .collect())
}

fn parse_ai_risk(category: RiskCategory, entry: &Value) -> Option<RiskItem> {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let risk_type = text("type")?;
    let details = text("details")?;
    let severity = entry.get("severity").and_then(parse_severity)?;

    Some(RiskItem {
        category,
        risk_type,
        severity,
        impact: text("impact").map_or(Impact::Medium, |s| Impact::parse_loose(&s)),
        likelihood: text("likelihood").map_or(Likelihood::Medium, |s| Likelihood::parse_loose(&s)),
        details,
        evidence: text("evidence"),
        mitigation: text("mitigation"),
        investor_concern: text("investor_concern"),
        source: RiskSource::Ai,
    })
}

/// Severity as a number or numeric string, `"8/10"` reads as 8.
fn parse_severity(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::String(s) => {
            let head = s.split(['/', ' ']).next().unwrap_or_default();
            parse_number(&Value::String(head.to_string()))?
        }
        other => parse_number(other)?,
    };
    Some(raw.round().clamp(1.0, 10.0) as u8)
}

fn profile_excerpt(profile: &StartupProfile) -> String {
    let json = serde_json::to_string_pretty(profile).unwrap_or_default();
    json.chars().take(MAX_PROFILE_CHARS).collect()
}

fn prompt(category: RiskCategory, profile_json: &str) -> String {
    format!(
        "You are a senior investment analyst reviewing {category} risk for a startup.\n\n\
         STARTUP DATA:\n{profile_json}\n\n\
         Focus on: {focus}.\n\n\
         Return only a JSON array of 3 to 5 risks, each an object with keys:\n\
         \"type\" (short title case phrase, no underscores), \"severity\" (integer 1-10, 10 is deal-breaking), \
         \"details\", \"evidence\", \"impact\" (low|medium|high|critical), \"likelihood\" (low|medium|high), \
         \"mitigation\", \"investor_concern\".\n\
         Only include risks supported by the data. Judge against stage-appropriate expectations.",
        focus = category.focus(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::testing::{FixedClient, ScriptedClient};
    use crate::profile::Financials;
    use dealscope_models::providers::DisabledClient;
    use serde_json::json;

    fn scenario_profile() -> StartupProfile {
        StartupProfile {
            financials: Financials {
                revenue: Some(400_000.0),
                growth_rate: Some(0.43),
                burn_rate: Some(16_867.0),
                runway_months: Some(6.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn parse_discards_incomplete_entries_and_clamps_severity() {
        let payload = json!([
            {"type": "Burn Too High", "severity": 14, "details": "burn exceeds plan"},
            {"type": "No Severity", "details": "missing"},
            {"severity": 5, "details": "no type"},
            {"type": "Stringly", "severity": "6/10", "details": "text severity", "impact": "HIGH"},
            {"type": "Tiny", "severity": 0.2, "details": "clamped up"},
            "not an object",
        ]);

        let items = parse_ai_risks(RiskCategory::Financial, payload).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].severity, 10);
        assert_eq!(items[0].impact, Impact::Medium);
        assert_eq!(items[1].severity, 6);
        assert_eq!(items[1].impact, Impact::High);
        assert_eq!(items[2].severity, 1);
        assert!(items.iter().all(|i| i.source == RiskSource::Ai));
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(parse_ai_risks(RiskCategory::Market, json!({"risks": []})).is_err());
    }

    #[test]
    fn supplement_skips_duplicate_types() {
        let ai = vec![RiskItem::heuristic(RiskCategory::Team, "single founder risk", 6, Impact::Medium, "ai")];
        let fallback = vec![
            RiskItem::heuristic(RiskCategory::Team, "Single Founder Risk", 6, Impact::Medium, "h"),
            RiskItem::heuristic(RiskCategory::Team, "A", 4, Impact::Low, "h"),
            RiskItem::heuristic(RiskCategory::Team, "B", 4, Impact::Low, "h"),
            RiskItem::heuristic(RiskCategory::Team, "C", 4, Impact::Low, "h"),
        ];
        let merged = supplement(ai, fallback);
        let types: Vec<_> = merged.iter().map(|r| r.risk_type.as_str()).collect();
        assert_eq!(types, vec!["single founder risk", "A", "B"]);
    }

    #[tokio::test]
    async fn disabled_client_uses_heuristics_for_every_category() {
        let engine = RiskEngine::new(Arc::new(DisabledClient));
        let assessment = engine.assess(&scenario_profile()).await;

        assert_eq!(assessment.risks.len(), 5);
        let financial = &assessment.risks[&RiskCategory::Financial];
        assert_eq!(financial[0].risk_type, "Short Financial Runway");
        assert_eq!(financial[0].severity, 8);
        assert!(assessment.all_items().all(|r| r.source == RiskSource::Heuristic));
        assert!((0.0..=10.0).contains(&assessment.overall_risk_score));
        assert!(assessment
            .risk_explanations
            .last()
            .unwrap()
            .starts_with("**Overall Assessment**"));
    }

    #[tokio::test]
    async fn shared_ai_type_survives_only_in_higher_priority_category() {
        // Every category receives the same three risks; only financial keeps them.
        let client = FixedClient(
            r#"[
                {"type": "Key Person Dependency", "severity": 7, "details": "one exec holds all relationships"},
                {"type": "Regulatory Exposure", "severity": 6, "details": "licensing pending"},
                {"type": "Customer Concentration", "severity": 5, "details": "top client is 60% of revenue"}
            ]"#,
        );
        let engine = RiskEngine::new(Arc::new(client));
        let assessment = engine.assess(&StartupProfile::default()).await;

        assert_eq!(assessment.risks[&RiskCategory::Financial].len(), 3);
        for category in &RiskCategory::ALL[1..] {
            assert!(assessment.risks[category].is_empty(), "{category} kept duplicates");
        }
        assert_eq!(assessment.overall_risk_score, 6.0);
        assert_eq!(assessment.metadata.total_risks, 3);
    }

    #[tokio::test]
    async fn partial_ai_output_is_supplemented() {
        let client = ScriptedClient::with_responses([
            r#"[{"type": "Cash Crunch", "severity": 9, "details": "ai"}]"#,
        ]);
        let engine = RiskEngine::new(Arc::new(client));
        let risks = engine
            .category_risks(RiskCategory::Financial, &scenario_profile(), "{}")
            .await;

        assert_eq!(risks.len(), 3);
        assert_eq!(risks[0].source, RiskSource::Ai);
        assert_eq!(risks[1].risk_type, "Short Financial Runway");
        assert_eq!(risks[1].source, RiskSource::Heuristic);
    }

    #[tokio::test]
    async fn ai_output_is_capped_at_five() {
        let client = FixedClient(
            r#"[
                {"type": "A", "severity": 5, "details": "d"},
                {"type": "B", "severity": 5, "details": "d"},
                {"type": "C", "severity": 5, "details": "d"},
                {"type": "D", "severity": 5, "details": "d"},
                {"type": "E", "severity": 5, "details": "d"},
                {"type": "F", "severity": 5, "details": "d"}
            ]"#,
        );
        let engine = RiskEngine::new(Arc::new(client));
        let risks = engine
            .category_risks(RiskCategory::Market, &StartupProfile::default(), "{}")
            .await;
        assert_eq!(risks.len(), 5);
    }

    #[test]
    fn prompt_names_category_and_truncates_profile() {
        let big = StartupProfile {
            description: Some("x".repeat(10_000)),
            ..Default::default()
        };
        let excerpt = profile_excerpt(&big);
        assert_eq!(excerpt.chars().count(), MAX_PROFILE_CHARS);
        assert!(prompt(RiskCategory::Team, &excerpt).contains("team risk"));
    }
}
