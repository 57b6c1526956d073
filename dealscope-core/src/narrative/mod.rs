//! Deal note generation.
//!
//! Best-effort prose over the finished analysis. Failures never fail the
//! pipeline; they become a [`DealNoteOutcome::Failed`] record carrying a
//! deterministic plain-text summary instead.

mod generator;
mod types;

pub use generator::{DealNoteGenerator, DealNoteInput, fallback_summary};
pub use types::{DealNote, DealNoteOutcome, SummaryStats};
