//! Session records and identifiers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::profile::StartupProfile;
use crate::scoring::DimensionWeights;

const SESSION_PREFIX: &str = "analysis_";

/// Identifier of one analysis session, rendered as `analysis_<32 hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Create a new time-ordered session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("{SESSION_PREFIX}{}", Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.strip_prefix(SESSION_PREFIX).is_some_and(|rest| {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidSessionId(s.to_string()))
        }
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse status visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        })
    }
}

/// Pipeline state machine.
///
/// ```text
/// Initiated ─▶ DocumentsProcessed ─▶ RiskAndBenchmarkDone ─▶ Scored ─▶ DealNoteAttempted ─▶ Completed
///     │                │                      │                │
///     └────────────────┴──────────────────────┴────────────────┴─▶ Failed
/// ```
///
/// Failure is impossible once the deal note has been attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Initiated,
    DocumentsProcessed,
    RiskAndBenchmarkDone,
    Scored,
    DealNoteAttempted,
    Completed,
    Failed,
}

impl PipelineStage {
    /// Progress percentage reported when this stage is reached.
    ///
    /// `None` for [`PipelineStage::Failed`], which keeps the last value.
    pub fn progress(self) -> Option<u8> {
        match self {
            PipelineStage::Initiated => Some(0),
            PipelineStage::DocumentsProcessed => Some(40),
            PipelineStage::RiskAndBenchmarkDone => Some(70),
            PipelineStage::Scored => Some(85),
            PipelineStage::DealNoteAttempted => Some(95),
            PipelineStage::Completed => Some(100),
            PipelineStage::Failed => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PipelineStage::Initiated => "Analysis initiated",
            PipelineStage::DocumentsProcessed => "Documents processed",
            PipelineStage::RiskAndBenchmarkDone => "Risk and benchmark analysis complete",
            PipelineStage::Scored => "Weighted scoring complete",
            PipelineStage::DealNoteAttempted => "Deal note generation attempted",
            PipelineStage::Completed => "Analysis complete",
            PipelineStage::Failed => "Analysis failed",
        }
    }

    /// Whether a stage failure may still move the session to FAILED.
    pub fn can_fail(self) -> bool {
        matches!(
            self,
            PipelineStage::Initiated
                | PipelineStage::DocumentsProcessed
                | PipelineStage::RiskAndBenchmarkDone
                | PipelineStage::Scored
        )
    }

    pub fn status(self) -> AnalysisStatus {
        match self {
            PipelineStage::Completed => AnalysisStatus::Completed,
            PipelineStage::Failed => AnalysisStatus::Failed,
            _ => AnalysisStatus::Processing,
        }
    }
}

/// Caller request to analyze a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Opaque references handed to the document intelligence service.
    pub storage_refs: Vec<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Raw weights by dimension name; defaults apply when absent.
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
}

impl AnalysisRequest {
    pub fn new(storage_refs: Vec<String>) -> Self {
        Self {
            storage_refs,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    #[must_use]
    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.weights = Some(weights);
        self
    }
}

/// Persisted state of one analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: SessionId,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub status: AnalysisStatus,
    pub stage: PipelineStage,
    pub progress: u8,
    pub message: String,
    pub storage_refs: Vec<String>,
    pub weighting: DimensionWeights,
    #[serde(default)]
    pub error: Option<String>,
    /// Profile produced by document intelligence, kept for reweighting.
    #[serde(default)]
    pub profile: Option<StartupProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
}

impl AnalysisSession {
    /// Fresh session at [`PipelineStage::Initiated`].
    pub fn initiated(id: SessionId, request: &AnalysisRequest, weighting: DimensionWeights) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: request.owner_id.clone(),
            company_name: request.company_name.clone(),
            status: AnalysisStatus::Processing,
            stage: PipelineStage::Initiated,
            progress: 0,
            message: PipelineStage::Initiated.message().to_string(),
            storage_refs: request.storage_refs.clone(),
            weighting,
            error: None,
            profile: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            failed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != AnalysisStatus::Processing
    }
}
