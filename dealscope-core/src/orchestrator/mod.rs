//! Pipeline orchestration.
//!
//! One background task per session runs document intelligence, then risk
//! and benchmark analysis concurrently, then scoring, then a best-effort
//! deal note. Progress is written to the store at every stage boundary.

mod report;

pub use report::AnalysisReport;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use dealscope_models::providers::InferenceClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use crate::benchmark::{BenchmarkEngine, BenchmarkResult};
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result, StageError, ValidationError};
use crate::intelligence::DocumentIntelligence;
use crate::narrative::{DealNoteGenerator, DealNoteInput};
use crate::profile::StartupProfile;
use crate::risk::{RiskAssessment, RiskEngine};
use crate::scoring::{self, DimensionWeights, WeightedScoreResult};
use crate::store::{AnalysisStore, Collection};
use crate::types::{AnalysisRequest, AnalysisSession, AnalysisStatus, PipelineStage, SessionId};

/// Runs and queries analysis sessions.
///
/// Cheap to clone; every clone shares the same store, engines and client.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn AnalysisStore>,
    intelligence: Arc<dyn DocumentIntelligence>,
    risk: Arc<RiskEngine>,
    benchmark: Arc<BenchmarkEngine>,
    narrative: Arc<DealNoteGenerator>,
    default_weights: DimensionWeights,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn AnalysisStore>,
        intelligence: Arc<dyn DocumentIntelligence>,
        client: Arc<dyn InferenceClient>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            intelligence,
            risk: Arc::new(RiskEngine::new(client.clone())),
            benchmark: Arc::new(BenchmarkEngine::new(client.clone())),
            narrative: Arc::new(DealNoteGenerator::new(client, config.narrative)),
            default_weights: config.default_weights,
        }
    }

    /// Validate, persist a new session, and run it in the background.
    ///
    /// Returns as soon as the session record exists.
    pub async fn start(&self, request: AnalysisRequest) -> Result<SessionId> {
        let (id, _handle) = self.start_detached(request).await?;
        Ok(id)
    }

    /// Like [`start`](Self::start), also returning the background task.
    pub async fn start_detached(
        &self,
        request: AnalysisRequest,
    ) -> Result<(SessionId, JoinHandle<()>)> {
        let weighting = self.validate(&request)?;

        let id = SessionId::new();
        let session = AnalysisSession::initiated(id.clone(), &request, weighting);
        self.store
            .insert(Collection::Analysis, id.as_str(), serde_json::to_value(&session)?)
            .await?;

        tracing::info!(
            session_id = %id,
            refs = request.storage_refs.len(),
            owner = request.owner_id.as_deref().unwrap_or("-"),
            "analysis session started"
        );

        let this = self.clone();
        let run_id = id.clone();
        let handle = tokio::spawn(async move {
            this.run(run_id, request).await;
        });
        Ok((id, handle))
    }

    /// Execute every stage for an existing session.
    ///
    /// Stage errors end the session as FAILED. Nothing is returned to the
    /// caller; the outcome lives in the store.
    pub async fn run(&self, id: SessionId, request: AnalysisRequest) {
        let mut stage = PipelineStage::Initiated;
        match self.execute(&id, &request, &mut stage).await {
            Ok(()) => tracing::info!(session_id = %id, "analysis completed"),
            Err(e) if stage.can_fail() => {
                tracing::error!(session_id = %id, ?stage, error = %e, "analysis failed");
                self.mark_failed(&id, &e).await;
            }
            Err(e) => {
                // FAILED is unreachable here, so the session has no terminal marker
                tracing::error!(
                    critical = true,
                    session_id = %id,
                    ?stage,
                    error = %e,
                    "error after deal note stage, session left processing"
                );
            }
        }
    }

    /// Session record with all stored stage results.
    pub async fn get(&self, id: &str) -> Result<AnalysisReport> {
        let id: SessionId = id.parse()?;
        let session = self.session(id.as_str()).await?;

        let (risk_assessment, benchmark, weighted_scores, deal_note) = tokio::join!(
            self.load(Collection::RiskAnalysis, &id),
            self.load(Collection::BenchmarkAnalysis, &id),
            self.load(Collection::WeightedScores, &id),
            self.load(Collection::DealNote, &id),
        );

        Ok(AnalysisReport {
            session,
            risk_assessment: risk_assessment?,
            benchmark: benchmark?,
            weighted_scores: weighted_scores?,
            deal_note: deal_note?,
        })
    }

    /// Session record alone, for progress polling.
    pub async fn session(&self, id: &str) -> Result<AnalysisSession> {
        let id: SessionId = id.parse()?;
        self.load(Collection::Analysis, &id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(id.to_string()))
    }

    /// Recompute scores for a completed session with new weights.
    ///
    /// Uses only the persisted profile, risk assessment and benchmark.
    pub async fn reweight(
        &self,
        id: &str,
        raw_weights: &BTreeMap<String, f64>,
    ) -> Result<WeightedScoreResult> {
        let weights = DimensionWeights::from_map(raw_weights)?;
        let session = self.session(id).await?;
        let id = session.id.clone();

        if session.status != AnalysisStatus::Completed {
            return Err(AnalysisError::InvalidState {
                expected: AnalysisStatus::Completed.to_string(),
                actual: session.status.to_string(),
            });
        }
        let profile = session
            .profile
            .ok_or_else(|| AnalysisError::Incomplete("profile".to_string()))?;

        let (risk, benchmark) = tokio::try_join!(
            self.load::<RiskAssessment>(Collection::RiskAnalysis, &id),
            self.load::<BenchmarkResult>(Collection::BenchmarkAnalysis, &id),
        )?;
        let risk = risk.ok_or_else(|| AnalysisError::Incomplete("risk assessment".to_string()))?;
        let benchmark =
            benchmark.ok_or_else(|| AnalysisError::Incomplete("benchmark".to_string()))?;

        let result = scoring::score(&profile, &risk, &benchmark, &weights);
        self.store
            .update(Collection::WeightedScores, id.as_str(), record(&id, &result)?)
            .await?;
        self.store
            .update(Collection::Analysis, id.as_str(), json!({ "weighting": weights }))
            .await?;

        tracing::info!(
            session_id = %id,
            overall_score = result.overall_score,
            tier = %result.recommendation.tier,
            "session reweighted"
        );
        Ok(result)
    }

    fn validate(&self, request: &AnalysisRequest) -> Result<DimensionWeights> {
        if request.storage_refs.iter().all(|r| r.trim().is_empty()) {
            return Err(ValidationError::NoInputReferences.into());
        }
        match &request.weights {
            Some(raw) => Ok(DimensionWeights::from_map(raw)?),
            None => Ok(self.default_weights),
        }
    }

    async fn execute(
        &self,
        id: &SessionId,
        request: &AnalysisRequest,
        stage: &mut PipelineStage,
    ) -> Result<()> {
        let weights = self.validate(request)?;

        // Document intelligence
        let mut profile = self
            .intelligence
            .extract(&request.storage_refs)
            .await
            .map_err(|e| StageError::DocumentProcessing(e.to_string()))?;
        if profile.company_name.is_none() {
            profile.company_name = request.company_name.clone();
        }
        self.advance(
            id,
            stage,
            PipelineStage::DocumentsProcessed,
            json!({
                "profile": profile,
                "company_name": profile.company_name,
            }),
        )
        .await?;

        // Risk and benchmark, joined both-or-neither
        let profile = Arc::new(profile);
        let (risk, benchmark) = tokio::try_join!(
            self.risk_stage(id, profile.clone()),
            self.benchmark_stage(id, profile.clone()),
        )?;
        self.advance(id, stage, PipelineStage::RiskAndBenchmarkDone, json!({}))
            .await?;

        // Scoring
        let scores = scoring::score(&profile, &risk, &benchmark, &weights);
        self.store
            .insert(Collection::WeightedScores, id.as_str(), record(id, &scores)?)
            .await
            .map_err(|e| StageError::Scoring(e.to_string()))?;
        self.advance(id, stage, PipelineStage::Scored, json!({})).await?;

        // Deal note, never fatal
        let outcome = self
            .narrative
            .outcome(DealNoteInput {
                profile: &profile,
                risk: &risk,
                benchmark: &benchmark,
                scores: &scores,
            })
            .await;
        match record(id, &outcome) {
            Ok(note) => {
                if let Err(e) = self.store.insert(Collection::DealNote, id.as_str(), note).await {
                    tracing::warn!(session_id = %id, error = %e, "failed to store deal note");
                }
            }
            Err(e) => tracing::warn!(session_id = %id, error = %e, "failed to encode deal note"),
        }
        self.advance(id, stage, PipelineStage::DealNoteAttempted, json!({}))
            .await?;

        self.advance(
            id,
            stage,
            PipelineStage::Completed,
            json!({ "completed_at": Utc::now() }),
        )
        .await
    }

    async fn risk_stage(&self, id: &SessionId, profile: Arc<StartupProfile>) -> Result<RiskAssessment> {
        let engine = self.risk.clone();
        let risk = tokio::spawn(async move { engine.assess(&profile).await })
            .await
            .map_err(|e| StageError::RiskAnalysis(e.to_string()))?;
        self.store
            .insert(Collection::RiskAnalysis, id.as_str(), record(id, &risk)?)
            .await
            .map_err(|e| StageError::RiskAnalysis(e.to_string()))?;
        tracing::debug!(session_id = %id, overall_risk_score = risk.overall_risk_score, "risk stage stored");
        Ok(risk)
    }

    async fn benchmark_stage(
        &self,
        id: &SessionId,
        profile: Arc<StartupProfile>,
    ) -> Result<BenchmarkResult> {
        let engine = self.benchmark.clone();
        let benchmark = tokio::spawn(async move { engine.analyze(&profile).await })
            .await
            .map_err(|e| StageError::Benchmark(e.to_string()))?;
        self.store
            .insert(Collection::BenchmarkAnalysis, id.as_str(), record(id, &benchmark)?)
            .await
            .map_err(|e| StageError::Benchmark(e.to_string()))?;
        tracing::debug!(session_id = %id, grade = %benchmark.overall_score.grade, "benchmark stage stored");
        Ok(benchmark)
    }

    /// Persist a stage boundary and move `current` forward.
    async fn advance(
        &self,
        id: &SessionId,
        current: &mut PipelineStage,
        next: PipelineStage,
        extra: Value,
    ) -> Result<()> {
        let mut update = json!({
            "stage": next,
            "status": next.status(),
            "message": next.message(),
        });
        if let Some(progress) = next.progress() {
            update["progress"] = json!(progress);
        }
        if let (Value::Object(fields), Value::Object(extra)) = (&mut update, extra) {
            fields.extend(extra);
        }

        self.store
            .update(Collection::Analysis, id.as_str(), update)
            .await?;
        *current = next;
        tracing::info!(session_id = %id, stage = ?next, progress = ?next.progress(), "stage reached");
        Ok(())
    }

    async fn mark_failed(&self, id: &SessionId, error: &AnalysisError) {
        let update = json!({
            "status": AnalysisStatus::Failed,
            "stage": PipelineStage::Failed,
            "message": PipelineStage::Failed.message(),
            "error": error.to_string(),
            "failed_at": Utc::now(),
        });
        if let Err(e) = self
            .store
            .update(Collection::Analysis, id.as_str(), update)
            .await
        {
            tracing::error!(
                critical = true,
                session_id = %id,
                error = %e,
                original_error = %error,
                "failed to record FAILED state"
            );
        }
    }

    async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &SessionId,
    ) -> Result<Option<T>> {
        match self.store.get(collection, id.as_str()).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

/// Serialize a stage result, tagged with its session id.
fn record<T: Serialize>(id: &SessionId, value: &T) -> Result<Value> {
    let mut value = serde_json::to_value(value)?;
    if let Value::Object(fields) = &mut value {
        fields.insert("analysis_id".to_string(), Value::String(id.to_string()));
    }
    Ok(value)
}
