//! Error types for dealscope-core

use thiserror::Error;

/// Top-level error type for dealscope-core
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Analysis not found: {0}")]
    NotFound(String),

    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("Analysis is incomplete, missing {0}")]
    Incomplete(String),

    #[error("Stage failed: {0}")]
    Stage(#[from] StageError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Input rejected before any work is done
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("At least one input reference is required")]
    NoInputReferences,

    #[error("Unknown scoring dimension: {0}")]
    UnknownDimension(String),

    #[error("Missing weight for dimension: {0}")]
    MissingDimension(String),

    #[error("Weight for {dimension} is not a finite number")]
    NonFiniteWeight { dimension: String },

    #[error("Weight for {dimension} must not be negative, got {weight}")]
    NegativeWeight { dimension: String, weight: f64 },

    #[error("Weights must sum to 1.0 (±0.01), got {sum:.4}")]
    WeightSum { sum: f64 },

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),
}

/// A pipeline stage raised; the session is marked failed with this message
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Document processing failed: {0}")]
    DocumentProcessing(String),

    #[error("Risk analysis failed: {0}")]
    RiskAnalysis(String),

    #[error("Benchmark analysis failed: {0}")]
    Benchmark(String),

    #[error("Scoring failed: {0}")]
    Scoring(String),
}

/// Errors from a document intelligence backend
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No readable document among {0} references")]
    NoReadableDocument(usize),

    #[error("Document {reference} is malformed: {reason}")]
    Malformed { reference: String, reason: String },

    #[error("Extraction backend error: {0}")]
    Backend(String),
}

/// Errors from an analysis store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Record already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    #[error("Record is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from deal-note generation. Never fails a pipeline run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NarrativeError {
    #[error("Narrative generation is disabled")]
    Disabled,

    #[error("AI client unavailable: {0}")]
    Unavailable(String),

    #[error("Narrative generation timed out after {0}s")]
    Timeout(u64),

    #[error("Narrative generation failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// Result type alias for dealscope-core operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_wraps_into_analysis_error() {
        let err: AnalysisError = ValidationError::WeightSum { sum: 0.9 }.into();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: Weights must sum to 1.0 (±0.01), got 0.9000"
        );
    }

    #[test]
    fn stage_error_message_includes_cause() {
        let err = StageError::DocumentProcessing("profile.json unreadable".to_string());
        assert_eq!(
            err.to_string(),
            "Document processing failed: profile.json unreadable"
        );
    }

    #[test]
    fn invalid_state_names_both_states() {
        let err = AnalysisError::InvalidState {
            expected: "completed".to_string(),
            actual: "processing".to_string(),
        };
        assert!(err.to_string().contains("expected completed, got processing"));
    }

    #[test]
    fn retries_exhausted_reports_attempts() {
        let err = NarrativeError::RetriesExhausted {
            attempts: 3,
            last_error: "empty response".to_string(),
        };
        assert!(err.to_string().contains("after 3 attempts"));
    }
}
