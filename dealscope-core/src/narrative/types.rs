use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::Tier;

/// Headline figures repeated alongside the note text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub risk_score: f64,
    pub sector: Option<String>,
    pub stage: Option<String>,
    pub revenue: Option<f64>,
    pub growth_rate: Option<f64>,
    pub team_size: Option<f64>,
    pub funding_raised: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealNote {
    pub generated_at: DateTime<Utc>,
    pub company_name: String,
    pub recommendation: Tier,
    pub overall_score: f64,
    pub content: String,
    pub word_count: usize,
    pub model: Option<String>,
    pub summary_stats: SummaryStats,
}

/// Stored result of the deal note stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DealNoteOutcome {
    Generated(DealNote),
    Failed {
        error: String,
        details: String,
        fallback_summary: String,
    },
}

impl DealNoteOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, DealNoteOutcome::Generated(_))
    }
}
