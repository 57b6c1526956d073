//! Cross-category risk deduplication.

use std::collections::{BTreeMap, HashSet};

use super::types::{RiskCategory, RiskItem};

/// Drop repeated risk types, keeping the first occurrence in priority order.
///
/// Categories are walked financial, market, team, product, operational.
/// Types compare lowercase and trimmed. Every category is present in the
/// output, possibly empty.
pub fn deduplicate(
    mut risks: BTreeMap<RiskCategory, Vec<RiskItem>>,
) -> BTreeMap<RiskCategory, Vec<RiskItem>> {
    let mut seen = HashSet::new();
    RiskCategory::ALL
        .into_iter()
        .map(|category| {
            let kept = risks
                .remove(&category)
                .unwrap_or_default()
                .into_iter()
                .filter(|item| seen.insert(item.normalized_type()))
                .collect();
            (category, kept)
        })
        .collect()
}
