//! Document intelligence boundary.
//!
//! Turns input storage references into a typed [`StartupProfile`]. The
//! orchestrator treats implementations as opaque; any error aborts the run.

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::profile::StartupProfile;

/// Extracts a startup profile from uploaded documents
#[async_trait]
pub trait DocumentIntelligence: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Build one profile from all referenced documents
    async fn extract(&self, storage_refs: &[String]) -> Result<StartupProfile, ExtractionError>;
}

/// Returns the same profile for any references.
///
/// For callers that already hold a structured profile.
#[derive(Debug, Clone)]
pub struct StaticIntelligence {
    profile: StartupProfile,
}

impl StaticIntelligence {
    pub fn new(profile: StartupProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl DocumentIntelligence for StaticIntelligence {
    fn name(&self) -> &str {
        "static"
    }

    async fn extract(&self, storage_refs: &[String]) -> Result<StartupProfile, ExtractionError> {
        if storage_refs.is_empty() {
            return Err(ExtractionError::NoReadableDocument(0));
        }
        Ok(self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_intelligence_returns_profile() {
        let profile = StartupProfile {
            company_name: Some("Acme".to_string()),
            ..Default::default()
        };
        let intelligence = StaticIntelligence::new(profile.clone());

        let extracted = intelligence.extract(&["deck.pdf".to_string()]).await.unwrap();
        assert_eq!(extracted, profile);
        assert!(intelligence.extract(&[]).await.is_err());
    }
}
