//! AI inference clients for dealscope.
//!
//! This crate provides:
//! - The [`InferenceClient`](providers::InferenceClient) capability used by the analysis engines
//! - Request/response types describing the expected payload shape
//! - Payload extraction that tolerates code fences and surrounding prose
//! - An Ollama-backed client and a disabled client for offline runs
//!
//! Clients are constructed once by the composition root and injected into each
//! engine as `Arc<dyn InferenceClient>`. Nothing in this crate is a global.
//!
//! ```text
//! ┌──────────────┐   GenerationRequest   ┌─────────────────┐
//! │  RiskEngine  │ ────────────────────▶ │ InferenceClient │
//! │  Benchmark   │ ◀──────────────────── │ (ollama / off)  │
//! │  DealNotes   │   GenerationResponse  └─────────────────┘
//! └──────────────┘
//! ```

mod error;
mod extract;
mod types;

pub mod providers;

pub use error::{Error, Result};
pub use extract::extract_payload;
pub use types::{ExpectedShape, GenerationRequest, GenerationResponse};
