//! Typed startup profile.
//!
//! The Document Intelligence boundary hands over loosely shaped JSON. It is
//! parsed into [`StartupProfile`] exactly once; every engine downstream reads
//! only this typed shape.
//!
//! Units: growth rates are percentages, burn rate is USD per month, revenue,
//! valuation and market size are USD, runway is months.
//!
//! Numeric fields tolerate the formatting noise extractors produce
//! (`"$1,200,000"`, `"43%"`, `"2.5M"`). Values that cannot be read become
//! `None`, never zero.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured company profile produced by document intelligence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupProfile {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub stage: Option<String>,
    pub geography: Option<String>,
    pub description: Option<String>,
    pub financials: Financials,
    pub market: Market,
    pub team: Team,
    pub product: Product,
    pub traction: Traction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Financials {
    #[serde(deserialize_with = "lenient_number")]
    pub revenue: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub growth_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub burn_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub funding_raised: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub funding_seeking: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub valuation: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub runway_months: Option<f64>,
}

impl Financials {
    /// Reported runway, or funding raised divided by monthly burn.
    pub fn effective_runway_months(&self) -> Option<f64> {
        if self.runway_months.is_some() {
            return self.runway_months;
        }
        match (self.funding_raised, self.burn_rate) {
            (Some(raised), Some(burn)) if burn > 0.0 => Some(raised / burn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Market {
    #[serde(deserialize_with = "lenient_number")]
    pub size: Option<f64>,
    pub target_segment: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub competitors: Vec<Value>,
    #[serde(deserialize_with = "lenient_number")]
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    #[serde(deserialize_with = "lenient_number")]
    pub size: Option<f64>,
    #[serde(deserialize_with = "lenient_list")]
    pub founders: Vec<Value>,
    #[serde(alias = "key_personnel", deserialize_with = "lenient_list")]
    pub key_hires: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub description: Option<String>,
    pub stage: Option<String>,
    pub competitive_advantage: Option<String>,
    pub business_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traction {
    #[serde(deserialize_with = "lenient_number")]
    pub customers: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub users: Option<f64>,
    #[serde(deserialize_with = "lenient_list")]
    pub partnerships: Vec<Value>,
}

impl StartupProfile {
    /// Parse a profile from extractor output.
    ///
    /// Accepts a bare profile object or one wrapped in `synthesized_data`.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let inner = match value {
            Value::Object(mut map) if map.get("synthesized_data").is_some_and(Value::is_object) => {
                map.remove("synthesized_data").unwrap_or_default()
            }
            other => other,
        };
        serde_json::from_value(inner)
    }

    /// Company stage lowercased with spaces and hyphens as underscores.
    ///
    /// `"Series A"` and `"series-a"` both become `series_a`.
    pub fn normalized_stage(&self) -> String {
        normalize_stage(self.stage.as_deref().unwrap_or_default())
    }

    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or("Unknown Company")
    }
}

pub(crate) fn normalize_stage(stage: &str) -> String {
    stage
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Character length of optional text after trimming.
pub(crate) fn text_len(text: Option<&str>) -> usize {
    text.map_or(0, |t| t.trim().chars().count())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(other) => vec![other],
    })
}

/// Read a number out of a JSON value, tolerating currency formatting.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_numeric_text(s)?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '_') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, multiplier) = match cleaned.chars().last()?.to_ascii_lowercase() {
        'k' => (&cleaned[..cleaned.len() - 1], 1e3),
        'm' => (&cleaned[..cleaned.len() - 1], 1e6),
        'b' => (&cleaned[..cleaned.len() - 1], 1e9),
        't' => (&cleaned[..cleaned.len() - 1], 1e12),
        _ => (cleaned.as_str(), 1.0),
    };
    digits.parse::<f64>().ok().map(|n| n * multiplier)
}
