//! Scoring dimensions and validated weights.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// The six weighted evaluation axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    GrowthPotential,
    MarketOpportunity,
    TeamQuality,
    ProductTechnology,
    FinancialMetrics,
    CompetitivePosition,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::GrowthPotential,
        Dimension::MarketOpportunity,
        Dimension::TeamQuality,
        Dimension::ProductTechnology,
        Dimension::FinancialMetrics,
        Dimension::CompetitivePosition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::GrowthPotential => "growth_potential",
            Dimension::MarketOpportunity => "market_opportunity",
            Dimension::TeamQuality => "team_quality",
            Dimension::ProductTechnology => "product_technology",
            Dimension::FinancialMetrics => "financial_metrics",
            Dimension::CompetitivePosition => "competitive_position",
        }
    }

    /// Lowercase words, e.g. "growth potential".
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Title case words, e.g. "Growth Potential".
    pub fn title(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                chars
                    .next()
                    .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownDimension(s.to_string()))
    }
}

/// Weights for all six dimensions, finite and summing to 1.0 ± 0.01.
///
/// Only constructible through validation. Serializes as a name → weight map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct DimensionWeights([f64; 6]);

impl DimensionWeights {
    /// Validate a raw name → weight map.
    ///
    /// The map must name exactly the six dimensions, each weight finite and
    /// non-negative.
    pub fn from_map(raw: &BTreeMap<String, f64>) -> Result<Self, ValidationError> {
        let mut weights = [f64::NAN; 6];
        for (name, weight) in raw {
            let dimension: Dimension = name.parse()?;
            if !weight.is_finite() {
                return Err(ValidationError::NonFiniteWeight {
                    dimension: dimension.to_string(),
                });
            }
            if *weight < 0.0 {
                return Err(ValidationError::NegativeWeight {
                    dimension: dimension.to_string(),
                    weight: *weight,
                });
            }
            weights[dimension as usize] = *weight;
        }

        if let Some(missing) = Dimension::ALL.into_iter().find(|d| weights[*d as usize].is_nan()) {
            return Err(ValidationError::MissingDimension(missing.to_string()));
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSum { sum });
        }
        Ok(Self(weights))
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.0[dimension as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(d, w)| (d.to_string(), w)).collect()
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self([0.25, 0.20, 0.20, 0.15, 0.10, 0.10])
    }
}

impl TryFrom<BTreeMap<String, f64>> for DimensionWeights {
    type Error = ValidationError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_map(&raw)
    }
}

impl From<DimensionWeights> for BTreeMap<String, f64> {
    fn from(weights: DimensionWeights) -> Self {
        weights.to_map()
    }
}
