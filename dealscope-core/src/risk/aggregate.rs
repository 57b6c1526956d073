//! Overall score, summary statistics, and explanation strings.

use std::collections::BTreeMap;

use super::types::{
    RiskAssessment, RiskCategory, RiskItem, RiskMetadata, RiskSummary, SeverityBands,
};

type CategoryRisks = BTreeMap<RiskCategory, Vec<RiskItem>>;

/// Severity at or above which a risk counts as high.
pub const HIGH_SEVERITY: u8 = 7;
const MAX_EXPLANATIONS: usize = 5;

/// Build the full assessment from already deduplicated category risks.
pub fn assemble(risks: CategoryRisks) -> RiskAssessment {
    let overall_risk_score = overall_risk_score(&risks);
    tracing::debug!(overall_risk_score, "risk assessment aggregated");

    RiskAssessment {
        risk_summary: summarize(&risks),
        risk_explanations: explanations(&risks, overall_risk_score),
        metadata: metadata(&risks),
        overall_risk_score,
        risks,
    }
}

/// Weighted mean of category mean severities over non-empty categories.
///
/// Always within `[0, 10]`; zero when no category has a risk.
pub fn overall_risk_score(risks: &CategoryRisks) -> f64 {
    let (weighted, weight) = risks
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .fold((0.0, 0.0), |(weighted, weight), (category, items)| {
            let mean = items.iter().map(|r| f64::from(r.severity)).sum::<f64>() / items.len() as f64;
            (weighted + mean * category.weight(), weight + category.weight())
        });

    if weight <= 0.0 {
        return 0.0;
    }
    round2((weighted / weight).clamp(0.0, 10.0))
}

pub fn summarize(risks: &CategoryRisks) -> RiskSummary {
    let mut bands = SeverityBands::default();
    let mut total = 0usize;
    let mut severity_sum = 0u32;

    for item in risks.values().flatten() {
        total += 1;
        severity_sum += u32::from(item.severity);
        match item.severity {
            0..=3 => bands.low += 1,
            4..=6 => bands.medium += 1,
            7..=9 => bands.high += 1,
            _ => bands.critical += 1,
        }
    }

    let average_severity = if total == 0 {
        0.0
    } else {
        round2(f64::from(severity_sum) / total as f64)
    };

    RiskSummary {
        total_risks: total,
        by_severity: bands,
        by_category: risks.iter().map(|(c, items)| (*c, items.len())).collect(),
        average_severity,
    }
}

pub fn metadata(risks: &CategoryRisks) -> RiskMetadata {
    RiskMetadata {
        categories_analyzed: RiskCategory::ALL.len(),
        total_risks: risks.values().map(Vec::len).sum(),
        high_severity_risks: risks
            .values()
            .flatten()
            .filter(|r| r.severity >= HIGH_SEVERITY)
            .count(),
    }
}

/// Narrative lines for the most severe risks, then one overall sentence.
pub fn explanations(risks: &CategoryRisks, overall_score: f64) -> Vec<String> {
    let mut severe: Vec<&RiskItem> = risks
        .values()
        .flatten()
        .filter(|r| r.severity >= HIGH_SEVERITY)
        .collect();
    // Stable: ties keep category priority order.
    severe.sort_by(|a, b| b.severity.cmp(&a.severity));

    let mut lines: Vec<String> = severe
        .iter()
        .take(MAX_EXPLANATIONS)
        .map(|r| format!("**{} Risk**: {} (Impact: {})", r.category.title(), r.details, r.impact))
        .collect();

    let categories_with_risks = risks.values().filter(|items| !items.is_empty()).count();
    let overall = if severe.is_empty() {
        format!(
            "**Overall Assessment**: No high-severity risks identified across {categories_with_risks} categories (overall risk {overall_score:.1}/10)."
        )
    } else {
        format!(
            "**Overall Assessment**: {} high-severity risks identified across {categories_with_risks} categories (overall risk {overall_score:.1}/10).",
            severe.len()
        )
    };
    lines.push(overall);
    lines
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
