//! dealscope-core: Startup investment analysis pipeline
//!
//! This crate provides the analysis engines and the pipeline that drives them:
//!
//! - **Orchestration** - [`Orchestrator`] runs one background task per session and
//!   persists progress at every stage boundary
//! - **Risk assessment** - [`RiskEngine`] with AI-first generation, heuristic fallback
//!   and cross-category deduplication
//! - **Benchmarking** - [`BenchmarkEngine`] for percentile ranking against sector distributions
//! - **Scoring** - [`scoring::score`] for weighted dimension scores and a recommendation
//! - **Deal notes** - [`DealNoteGenerator`] with bounded retries and a timeout
//! - **Persistence** - [`AnalysisStore`] with in-memory and file-backed implementations
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dealscope_core::{
//!     AnalysisRequest, MemoryAnalysisStore, Orchestrator, PipelineConfig, StartupProfile,
//!     StaticIntelligence,
//! };
//! use dealscope_models::providers::DisabledClient;
//!
//! async fn example() -> dealscope_core::Result<()> {
//!     let orchestrator = Orchestrator::new(
//!         Arc::new(MemoryAnalysisStore::new()),
//!         Arc::new(StaticIntelligence::new(StartupProfile::default())),
//!         Arc::new(DisabledClient),
//!         PipelineConfig::default(),
//!     );
//!
//!     let id = orchestrator.start(AnalysisRequest::new(vec!["deck.pdf".into()])).await?;
//!     let report = orchestrator.get(id.as_str()).await?;
//!     println!("{}: {}%", report.session.id, report.session.progress);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//!  start() ──▶ DocumentIntelligence ──┬──▶ RiskEngine ──────┬──▶ scoring ──▶ DealNoteGenerator
//!                                     └──▶ BenchmarkEngine ─┘
//!                       every stage boundary ──▶ AnalysisStore
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
pub mod fallback;
pub mod intelligence;
pub mod narrative;
pub mod orchestrator;
pub mod profile;
pub mod risk;
pub mod scoring;
pub mod store;
pub mod types;

// Re-export key types for convenience
pub use benchmark::{BenchmarkEngine, BenchmarkMetric, BenchmarkResult};
pub use config::{NarrativeConfig, PipelineConfig};
pub use error::{
    AnalysisError, ExtractionError, NarrativeError, Result, StageError, StoreError,
    ValidationError,
};
pub use fallback::{FallbackAdapter, Provenance, Sourced};
pub use intelligence::{DocumentIntelligence, StaticIntelligence};
pub use narrative::{DealNote, DealNoteGenerator, DealNoteOutcome};
pub use orchestrator::{AnalysisReport, Orchestrator};
pub use profile::StartupProfile;
pub use risk::{RiskAssessment, RiskCategory, RiskEngine, RiskItem};
pub use scoring::{Dimension, DimensionWeights, Recommendation, Tier, WeightedScoreResult};
pub use store::{AnalysisStore, Collection, FileAnalysisStore, MemoryAnalysisStore};
pub use types::{AnalysisRequest, AnalysisSession, AnalysisStatus, PipelineStage, SessionId};
