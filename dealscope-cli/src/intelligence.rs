//! Local document intelligence: storage references are paths to JSON profiles
//! already extracted from pitch material.
//!
//! The first readable document is authoritative. Later documents only fill
//! fields the earlier ones left null or missing.

use std::path::Path;

use async_trait::async_trait;
use dealscope_core::{DocumentIntelligence, ExtractionError, StartupProfile};
use serde_json::Value;
use tracing::{debug, warn};

pub struct JsonProfileIntelligence;

#[async_trait]
impl DocumentIntelligence for JsonProfileIntelligence {
    fn name(&self) -> &str {
        "json-profile"
    }

    async fn extract(&self, storage_refs: &[String]) -> Result<StartupProfile, ExtractionError> {
        let mut merged: Option<Value> = None;

        for reference in storage_refs {
            let Some(document) = read_document(reference).await? else {
                continue;
            };
            merged = Some(match merged {
                Some(mut base) => {
                    fill_missing(&mut base, document);
                    base
                }
                None => document,
            });
        }

        let value = merged.ok_or(ExtractionError::NoReadableDocument(storage_refs.len()))?;
        StartupProfile::from_value(value).map_err(|e| ExtractionError::Backend(e.to_string()))
    }
}

/// Read one reference. Unreadable files are skipped; unparseable ones are errors.
async fn read_document(reference: &str) -> Result<Option<Value>, ExtractionError> {
    let contents = match tokio::fs::read_to_string(Path::new(reference)).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!(reference, error = %e, "Skipping unreadable document");
            return Ok(None);
        }
    };

    let value: Value =
        serde_json::from_str(&contents).map_err(|e| ExtractionError::Malformed {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;
    if !value.is_object() {
        return Err(ExtractionError::Malformed {
            reference: reference.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    }

    debug!(reference, "Read profile document");
    Ok(Some(unwrap_synthesized(value)))
}

fn unwrap_synthesized(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("synthesized_data").is_some_and(Value::is_object) => {
            map.remove("synthesized_data").unwrap_or_default()
        }
        other => other,
    }
}

/// Copy fields from `overlay` into `base` wherever `base` is null or missing
fn fill_missing(base: &mut Value, overlay: Value) {
    if base.is_null() {
        *base = overlay;
        return;
    }
    if let (Value::Object(base_map), Value::Object(overlay_map)) = (base, overlay) {
        for (key, value) in overlay_map {
            match base_map.get_mut(&key) {
                Some(existing) => fill_missing(existing, value),
                None => {
                    base_map.insert(key, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: &Value) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_reads_single_profile() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "acme.json",
            &json!({
                "company_name": "Acme",
                "sector": "fintech",
                "financials": {"revenue": "$1,200,000", "growth_rate": "40%"}
            }),
        );

        let profile = JsonProfileIntelligence.extract(&[path]).await.unwrap();

        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
        assert_eq!(profile.financials.revenue, Some(1_200_000.0));
        assert_eq!(profile.financials.growth_rate, Some(40.0));
    }

    #[tokio::test]
    async fn test_unwraps_synthesized_data() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "wrapped.json",
            &json!({"synthesized_data": {"company_name": "Wrapped Co"}}),
        );

        let profile = JsonProfileIntelligence.extract(&[path]).await.unwrap();
        assert_eq!(profile.company_name.as_deref(), Some("Wrapped Co"));
    }

    #[tokio::test]
    async fn test_later_documents_fill_gaps_only() {
        let dir = TempDir::new().unwrap();
        let deck = write_json(
            &dir,
            "deck.json",
            &json!({
                "company_name": "Acme",
                "sector": null,
                "financials": {"revenue": 500000}
            }),
        );
        let memo = write_json(
            &dir,
            "memo.json",
            &json!({
                "company_name": "Acme Holdings",
                "sector": "saas",
                "financials": {"revenue": 900000, "burn_rate": 80000}
            }),
        );

        let profile = JsonProfileIntelligence.extract(&[deck, memo]).await.unwrap();

        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
        assert_eq!(profile.sector.as_deref(), Some("saas"));
        assert_eq!(profile.financials.revenue, Some(500_000.0));
        assert_eq!(profile.financials.burn_rate, Some(80_000.0));
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let real = write_json(&dir, "real.json", &json!({"company_name": "Acme"}));
        let missing = dir.path().join("gone.json").to_string_lossy().into_owned();

        let profile = JsonProfileIntelligence
            .extract(&[missing, real])
            .await
            .unwrap();
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_no_readable_document() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.json").to_string_lossy().into_owned();

        let err = JsonProfileIntelligence.extract(&[missing]).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoReadableDocument(1)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonProfileIntelligence
            .extract(&[path.to_string_lossy().into_owned()])
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed { .. }));
    }
}
