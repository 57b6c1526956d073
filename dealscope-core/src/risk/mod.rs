//! Risk assessment.
//!
//! Five fixed categories, each AI-first with a deterministic heuristic
//! fallback, merged through one priority-ordered deduplication pass.

mod aggregate;
mod dedup;
mod engine;
mod heuristics;
mod types;

pub use aggregate::{HIGH_SEVERITY, assemble, explanations, overall_risk_score, summarize};
pub(crate) use aggregate::round2;
pub use dedup::deduplicate;
pub use engine::RiskEngine;
pub use heuristics::{MAX_RISKS_PER_CATEGORY, MIN_RISKS_PER_CATEGORY, fallback_risks};
pub use types::{
    Impact, Likelihood, RiskAssessment, RiskCategory, RiskItem, RiskMetadata, RiskSource,
    RiskSummary, SeverityBands, normalize_type,
};
