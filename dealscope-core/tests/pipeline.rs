//! End-to-end pipeline tests against the in-memory store
//!
//! These cover the session state machine:
//! - Successful runs reach COMPLETED with every stage result stored
//! - Stage failures mark the session FAILED and keep earlier progress
//! - Deal note failures never fail the session
//! - Reweighting recomputes scores from persisted inputs only

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use dealscope_core::store::StoreResult;
use dealscope_core::{
    AnalysisError, AnalysisRequest, AnalysisStatus, AnalysisStore, Collection, DealNoteOutcome,
    DocumentIntelligence, ExtractionError, MemoryAnalysisStore, Orchestrator, PipelineConfig,
    PipelineStage, RiskCategory, StartupProfile, StaticIntelligence, StoreError, Tier,
    ValidationError,
};
use dealscope_core::scoring::weighted_sum;
use dealscope_models::providers::{DisabledClient, InferenceClient};
use dealscope_models::{GenerationRequest, GenerationResponse};

fn scenario_profile() -> StartupProfile {
    StartupProfile::from_value(json!({
        "synthesized_data": {
            "company_name": "Acme Rx",
            "sector": "HealthTech",
            "stage": "Seed",
            "financials": {
                "revenue": 400000,
                "growth_rate": 0.43,
                "burn_rate": 16867,
                "runway_months": 6
            },
            "market": {"size": "$12B", "competitors": ["CVS", "Walgreens"]},
            "team": {"size": 6, "founders": ["Ana", "Ben"]}
        }
    }))
    .unwrap()
}

fn orchestrator_with(
    store: Arc<dyn AnalysisStore>,
    intelligence: Arc<dyn DocumentIntelligence>,
    client: Arc<dyn InferenceClient>,
) -> Orchestrator {
    Orchestrator::new(store, intelligence, client, PipelineConfig::default())
}

fn offline(store: Arc<dyn AnalysisStore>) -> Orchestrator {
    orchestrator_with(
        store,
        Arc::new(StaticIntelligence::new(scenario_profile())),
        Arc::new(DisabledClient),
    )
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new(vec!["uploads/acme/deck.pdf".to_string()]).with_owner("user-1")
}

fn equal_weights() -> BTreeMap<String, f64> {
    [
        "growth_potential",
        "market_opportunity",
        "team_quality",
        "product_technology",
        "financial_metrics",
        "competitive_position",
    ]
    .into_iter()
    .map(|d| (d.to_string(), 1.0 / 6.0))
    .collect()
}

/// Extraction that always fails.
struct BrokenIntelligence;

#[async_trait]
impl DocumentIntelligence for BrokenIntelligence {
    fn name(&self) -> &str {
        "broken"
    }

    async fn extract(&self, _refs: &[String]) -> Result<StartupProfile, ExtractionError> {
        Err(ExtractionError::Backend("OCR service down".to_string()))
    }
}

/// Answers every prompt with prose that is not JSON.
struct ProseClient;

#[async_trait]
impl InferenceClient for ProseClient {
    fn name(&self) -> &str {
        "prose"
    }

    async fn generate(&self, _request: GenerationRequest) -> dealscope_models::Result<GenerationResponse> {
        Ok(GenerationResponse::text("**EXECUTIVE SUMMARY**\nAcme Rx looks promising."))
    }
}

/// Records every progress value written to the analysis collection.
///
/// Can be told to fail all updates, or inserts into one collection.
struct RecordingStore {
    inner: MemoryAnalysisStore,
    progress: Mutex<Vec<u64>>,
    fail_updates: bool,
    fail_insert: Option<Collection>,
    fail_completion: bool,
}

impl RecordingStore {
    fn new(fail_updates: bool) -> Self {
        Self {
            inner: MemoryAnalysisStore::new(),
            progress: Mutex::new(Vec::new()),
            fail_updates,
            fail_insert: None,
            fail_completion: false,
        }
    }

    fn failing_insert(collection: Collection) -> Self {
        Self {
            fail_insert: Some(collection),
            ..Self::new(false)
        }
    }
}

#[async_trait]
impl AnalysisStore for RecordingStore {
    async fn insert(&self, collection: Collection, id: &str, record: Value) -> StoreResult<()> {
        if self.fail_insert == Some(collection) {
            return Err(StoreError::Backend("boom".to_string()));
        }
        self.inner.insert(collection, id, record).await
    }

    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()> {
        if self.fail_updates
            || (self.fail_completion && partial.get("stage") == Some(&json!("COMPLETED")))
        {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        if collection == Collection::Analysis
            && let Some(progress) = partial.get("progress").and_then(Value::as_u64)
        {
            self.progress.lock().unwrap().push(progress);
        }
        self.inner.update(collection, id, partial).await
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        self.inner.get(collection, id).await
    }
}

#[tokio::test]
async fn offline_run_completes_with_all_results() {
    let store = Arc::new(MemoryAnalysisStore::new());
    let orchestrator = offline(store.clone());

    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let report = orchestrator.get(id.as_str()).await.unwrap();
    assert_eq!(report.session.status, AnalysisStatus::Completed);
    assert_eq!(report.session.stage, PipelineStage::Completed);
    assert_eq!(report.session.progress, 100);
    assert!(report.session.completed_at.is_some());
    assert_eq!(report.session.owner_id.as_deref(), Some("user-1"));
    assert_eq!(report.session.company_name.as_deref(), Some("Acme Rx"));

    let risk = report.risk_assessment.unwrap();
    assert_eq!(risk.risks.len(), 5);
    let financial = &risk.risks[&RiskCategory::Financial];
    let runway = financial
        .iter()
        .find(|r| r.risk_type == "Short Financial Runway")
        .expect("runway risk");
    assert_eq!(runway.severity, 8);
    assert!(!financial.iter().any(|r| r.risk_type == "Critical Runway Shortage"));

    let benchmark = report.benchmark.unwrap();
    assert!(benchmark.insights.is_empty());

    let scores = report.weighted_scores.unwrap();
    assert!((1.0..=10.0).contains(&scores.overall_score));

    // Deal note failed but the session still completed
    match report.deal_note.unwrap() {
        DealNoteOutcome::Failed { fallback_summary, .. } => {
            assert!(fallback_summary.contains("Acme Rx"));
        }
        other => panic!("expected failed deal note, got {other:?}"),
    }
    assert_eq!(store.len().await, 5);
}

#[tokio::test]
async fn progress_is_monotonic_through_every_stage() {
    let store = Arc::new(RecordingStore::new(false));
    let orchestrator = offline(store.clone());

    let (_id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let progress = store.progress.lock().unwrap().clone();
    assert_eq!(progress, vec![40, 70, 85, 95, 100]);
}

#[tokio::test]
async fn empty_references_are_rejected_before_persisting() {
    let store = Arc::new(MemoryAnalysisStore::new());
    let orchestrator = offline(store.clone());

    let err = orchestrator.start(AnalysisRequest::new(vec![])).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Validation(ValidationError::NoInputReferences)
    ));

    let err = orchestrator
        .start(AnalysisRequest::new(vec!["  ".to_string()]))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn invalid_weights_are_rejected_before_persisting() {
    let store = Arc::new(MemoryAnalysisStore::new());
    let orchestrator = offline(store.clone());

    let mut weights = equal_weights();
    weights.insert("growth_potential".to_string(), 0.5);
    let err = orchestrator
        .start(request().with_weights(weights))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::Validation(ValidationError::WeightSum { .. })
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn extraction_failure_marks_session_failed() {
    let store = Arc::new(MemoryAnalysisStore::new());
    let orchestrator = orchestrator_with(
        store.clone(),
        Arc::new(BrokenIntelligence),
        Arc::new(DisabledClient),
    );

    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let report = orchestrator.get(id.as_str()).await.unwrap();
    assert_eq!(report.session.status, AnalysisStatus::Failed);
    assert_eq!(report.session.stage, PipelineStage::Failed);
    assert_eq!(report.session.progress, 0);
    assert!(report.session.failed_at.is_some());
    let error = report.session.error.unwrap();
    assert!(error.contains("Document processing failed"), "{error}");
    assert!(error.contains("OCR service down"), "{error}");

    assert!(report.risk_assessment.is_none());
    assert!(report.weighted_scores.is_none());
    assert!(report.deal_note.is_none());
}

/// Run the offline pipeline against a store that rejects one collection.
async fn run_with_failing_insert(collection: Collection) -> dealscope_core::AnalysisReport {
    let store = Arc::new(RecordingStore::failing_insert(collection));
    let orchestrator = offline(store);

    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();
    orchestrator.get(id.as_str()).await.unwrap()
}

fn assert_failed_at(report: &dealscope_core::AnalysisReport, progress: u8, message: &str) {
    let session = &report.session;
    assert_eq!(session.status, AnalysisStatus::Failed);
    assert_eq!(session.stage, PipelineStage::Failed);
    assert_eq!(session.progress, progress);
    assert!(session.failed_at.is_some());
    assert!(session.completed_at.is_none());
    let error = session.error.as_deref().unwrap_or_default();
    assert!(error.contains(message), "{error}");
    assert!(error.contains("boom"), "{error}");
    assert!(report.deal_note.is_none());
}

#[tokio::test]
async fn risk_stage_failure_marks_session_failed() {
    let report = run_with_failing_insert(Collection::RiskAnalysis).await;
    assert_failed_at(&report, 40, "Risk analysis failed");
    assert!(report.risk_assessment.is_none());
    assert!(report.weighted_scores.is_none());
}

#[tokio::test]
async fn benchmark_stage_failure_marks_session_failed() {
    let report = run_with_failing_insert(Collection::BenchmarkAnalysis).await;
    assert_failed_at(&report, 40, "Benchmark analysis failed");
    assert!(report.benchmark.is_none());
    assert!(report.weighted_scores.is_none());
}

#[tokio::test]
async fn scoring_stage_failure_marks_session_failed() {
    let report = run_with_failing_insert(Collection::WeightedScores).await;
    assert_failed_at(&report, 70, "Scoring failed");
    assert!(report.risk_assessment.is_some());
    assert!(report.benchmark.is_some());
    assert!(report.weighted_scores.is_none());
}

#[tokio::test]
async fn deal_note_store_failure_still_completes() {
    let report = run_with_failing_insert(Collection::DealNote).await;
    assert_eq!(report.session.status, AnalysisStatus::Completed);
    assert_eq!(report.session.stage, PipelineStage::Completed);
    assert_eq!(report.session.progress, 100);
    assert!(report.session.error.is_none());
    assert!(report.weighted_scores.is_some());
    assert!(report.deal_note.is_none());
}

#[tokio::test]
async fn completion_write_failure_leaves_session_processing() {
    let store = Arc::new(RecordingStore {
        fail_completion: true,
        ..RecordingStore::new(false)
    });
    let orchestrator = offline(store.clone());

    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let report = orchestrator.get(id.as_str()).await.unwrap();
    assert_eq!(report.session.status, AnalysisStatus::Processing);
    assert_eq!(report.session.stage, PipelineStage::DealNoteAttempted);
    assert_eq!(report.session.progress, 95);
    assert!(report.session.failed_at.is_none());
    assert!(report.deal_note.is_some());
    assert_eq!(*store.progress.lock().unwrap(), vec![40, 70, 85, 95]);
}

#[tokio::test]
async fn failure_to_record_failed_state_is_contained() {
    let store = Arc::new(RecordingStore::new(true));
    let orchestrator = offline(store.clone());

    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    // The run must not panic even though every update fails.
    handle.await.unwrap();

    let session = orchestrator.session(id.as_str()).await.unwrap();
    assert_eq!(session.status, AnalysisStatus::Processing);
    assert_eq!(session.progress, 0);
}

#[tokio::test]
async fn generated_deal_note_alongside_fallback_engines() {
    let store = Arc::new(MemoryAnalysisStore::new());
    let orchestrator = orchestrator_with(
        store,
        Arc::new(StaticIntelligence::new(scenario_profile())),
        Arc::new(ProseClient),
    );

    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let report = orchestrator.get(id.as_str()).await.unwrap();
    assert_eq!(report.session.status, AnalysisStatus::Completed);
    match report.deal_note.unwrap() {
        DealNoteOutcome::Generated(note) => {
            assert_eq!(note.company_name, "Acme Rx");
            assert_eq!(note.model.as_deref(), Some("prose"));
        }
        other => panic!("expected generated deal note, got {other:?}"),
    }
}

#[tokio::test]
async fn reweight_is_pure_and_persisted() {
    let store = Arc::new(MemoryAnalysisStore::new());
    let orchestrator = offline(store.clone());
    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let first = orchestrator.reweight(id.as_str(), &equal_weights()).await.unwrap();
    let second = orchestrator.reweight(id.as_str(), &equal_weights()).await.unwrap();
    assert_eq!(first.dimension_scores, second.dimension_scores);
    assert_eq!(first.overall_score, second.overall_score);

    let report = orchestrator.get(id.as_str()).await.unwrap();
    assert_eq!(report.weighted_scores.unwrap().weights_applied, first.weights_applied);
    assert_eq!(report.session.weighting, first.weights_applied);
}

#[tokio::test]
async fn reweight_validates_before_loading() {
    let orchestrator = offline(Arc::new(MemoryAnalysisStore::new()));

    let mut weights = equal_weights();
    weights.remove("team_quality");
    let err = orchestrator
        .reweight("analysis_0123456789abcdef0123456789abcdef", &weights)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Validation(ValidationError::MissingDimension(_))
    ));
}

#[tokio::test]
async fn reweight_requires_completed_session() {
    let orchestrator = orchestrator_with(
        Arc::new(MemoryAnalysisStore::new()),
        Arc::new(BrokenIntelligence),
        Arc::new(DisabledClient),
    );
    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let err = orchestrator
        .reweight(id.as_str(), &equal_weights())
        .await
        .unwrap_err();
    match err {
        AnalysisError::InvalidState { expected, actual } => {
            assert_eq!(expected, "completed");
            assert_eq!(actual, "failed");
        }
        other => panic!("expected invalid state, got {other:?}"),
    }
}

#[tokio::test]
async fn lookups_validate_session_ids() {
    let orchestrator = offline(Arc::new(MemoryAnalysisStore::new()));

    let err = orchestrator.get("not-a-session").await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Validation(ValidationError::InvalidSessionId(_))
    ));

    let err = orchestrator
        .get("analysis_0123456789abcdef0123456789abcdef")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound(_)));
}

#[tokio::test]
async fn recommendation_follows_score_thresholds() {
    let orchestrator = offline(Arc::new(MemoryAnalysisStore::new()));
    let (id, handle) = orchestrator.start_detached(request()).await.unwrap();
    handle.await.unwrap();

    let scores = orchestrator.get(id.as_str()).await.unwrap().weighted_scores.unwrap();
    let exact = weighted_sum(&scores.dimension_scores, &scores.weights_applied);
    assert_eq!(scores.overall_score, (exact * 100.0).round() / 100.0);
    let expected = if exact >= 7.5 {
        Tier::Pursue
    } else if scores.overall_score >= 6.0 {
        Tier::Consider
    } else {
        Tier::Pass
    };
    assert_eq!(scores.recommendation.tier, expected);
    assert!(scores.recommendation.concerns.len() <= 3);
    assert!(scores.recommendation.strengths.len() <= 3);
}
