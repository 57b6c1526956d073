//! Risk assessment data types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The five fixed risk categories, declared in deduplication priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Financial,
    Market,
    Team,
    Product,
    Operational,
}

impl RiskCategory {
    /// All categories, highest priority first.
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Financial,
        RiskCategory::Market,
        RiskCategory::Team,
        RiskCategory::Product,
        RiskCategory::Operational,
    ];

    /// Contribution to the overall risk score.
    pub fn weight(self) -> f64 {
        match self {
            RiskCategory::Financial => 0.30,
            RiskCategory::Market => 0.25,
            RiskCategory::Team => 0.20,
            RiskCategory::Product => 0.15,
            RiskCategory::Operational => 0.10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Financial => "financial",
            RiskCategory::Market => "market",
            RiskCategory::Team => "team",
            RiskCategory::Product => "product",
            RiskCategory::Operational => "operational",
        }
    }

    /// Capitalized name for report text.
    pub fn title(self) -> &'static str {
        match self {
            RiskCategory::Financial => "Financial",
            RiskCategory::Market => "Market",
            RiskCategory::Team => "Team",
            RiskCategory::Product => "Product",
            RiskCategory::Operational => "Operational",
        }
    }

    /// What the AI prompt should concentrate on.
    pub(crate) fn focus(self) -> &'static str {
        match self {
            RiskCategory::Financial => {
                "runway, burn rate, revenue quality, growth assumptions, unit economics"
            }
            RiskCategory::Market => {
                "market size claims, competition density, target segment clarity, timing"
            }
            RiskCategory::Team => {
                "founder structure, team size for stage, key hires, execution capacity"
            }
            RiskCategory::Product => {
                "differentiation, product maturity for stage, business model clarity, technical risk"
            }
            RiskCategory::Operational => {
                "customer traction, conversion, partnerships, scalability of operations"
            }
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Impact tier of a risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

impl Impact {
    /// Read a tier out of loose model text, defaulting to medium.
    pub fn parse_loose(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("critical") {
            Impact::Critical
        } else if text.contains("high") {
            Impact::High
        } else if text.contains("low") {
            Impact::Low
        } else {
            Impact::Medium
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
            Impact::Critical => "critical",
        })
    }
}

/// Probability of a risk materializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    Low,
    Medium,
    High,
}

impl Likelihood {
    pub fn parse_loose(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("high") {
            Likelihood::High
        } else if text.contains("low") {
            Likelihood::Low
        } else {
            Likelihood::Medium
        }
    }
}

/// Producer of a risk item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSource {
    Ai,
    Heuristic,
}

/// One identified risk. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    pub category: RiskCategory,
    #[serde(rename = "type")]
    pub risk_type: String,
    /// 1 to 10, 10 being deal-breaking.
    pub severity: u8,
    pub impact: Impact,
    pub likelihood: Likelihood,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_concern: Option<String>,
    pub source: RiskSource,
}

impl RiskItem {
    /// Heuristic item with medium likelihood and no mitigation text.
    pub fn heuristic(
        category: RiskCategory,
        risk_type: impl Into<String>,
        severity: u8,
        impact: Impact,
        details: impl Into<String>,
    ) -> Self {
        Self {
            category,
            risk_type: risk_type.into(),
            severity: severity.clamp(1, 10),
            impact,
            likelihood: Likelihood::Medium,
            details: details.into(),
            evidence: None,
            mitigation: None,
            investor_concern: None,
            source: RiskSource::Heuristic,
        }
    }

    #[must_use]
    pub fn likelihood(mut self, likelihood: Likelihood) -> Self {
        self.likelihood = likelihood;
        self
    }

    #[must_use]
    pub fn mitigation(mut self, text: impl Into<String>) -> Self {
        self.mitigation = Some(text.into());
        self
    }

    #[must_use]
    pub fn concern(mut self, text: impl Into<String>) -> Self {
        self.investor_concern = Some(text.into());
        self
    }

    /// Type label used for duplicate detection.
    pub fn normalized_type(&self) -> String {
        normalize_type(&self.risk_type)
    }
}

pub fn normalize_type(risk_type: &str) -> String {
    risk_type.trim().to_lowercase()
}

/// Counts per severity band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBands {
    /// Severity 0 to 3.
    pub low: usize,
    /// Severity 4 to 6.
    pub medium: usize,
    /// Severity 7 to 9.
    pub high: usize,
    /// Severity 10.
    pub critical: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub total_risks: usize,
    pub by_severity: SeverityBands,
    pub by_category: BTreeMap<RiskCategory, usize>,
    pub average_severity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMetadata {
    pub categories_analyzed: usize,
    pub total_risks: usize,
    pub high_severity_risks: usize,
}

/// Deduplicated risks for all five categories plus aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risks: BTreeMap<RiskCategory, Vec<RiskItem>>,
    /// Weighted mean severity, 0 to 10.
    pub overall_risk_score: f64,
    pub risk_summary: RiskSummary,
    pub risk_explanations: Vec<String>,
    pub metadata: RiskMetadata,
}

impl RiskAssessment {
    pub fn all_items(&self) -> impl Iterator<Item = &RiskItem> {
        self.risks.values().flatten()
    }
}
