use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkResult;
use crate::narrative::DealNoteOutcome;
use crate::risk::RiskAssessment;
use crate::scoring::WeightedScoreResult;
use crate::types::AnalysisSession;

/// Session record merged with whatever stage results exist so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub session: AnalysisSession,
    pub risk_assessment: Option<RiskAssessment>,
    pub benchmark: Option<BenchmarkResult>,
    pub weighted_scores: Option<WeightedScoreResult>,
    pub deal_note: Option<DealNoteOutcome>,
}
