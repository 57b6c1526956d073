//! Weighted multi-dimension investment scoring.

mod dimensions;
mod engine;
mod recommendation;
mod weights;

pub use dimensions::DimensionScores;
pub use engine::{WeightedScoreResult, combine, score, score_with_weights, weighted_sum};
pub use recommendation::{Recommendation, Tier};
pub use weights::{Dimension, DimensionWeights, WEIGHT_SUM_TOLERANCE};
