//! Provider fallback chain: the first available provider wins.

use tracing::warn;

use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::traits::IEmbeddingProvider;

/// Ordered providers tried until one succeeds.
pub struct ProviderChain {
    providers: Vec<Box<dyn IEmbeddingProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self { providers: vec![] }
    }

    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.providers.push(provider);
    }

    /// The first available provider's name, for logging.
    pub fn active_provider_name(&self) -> &str {
        self.providers
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    /// Embed via the first provider that is available and succeeds.
    pub fn embed(&self, text: &str) -> EngineResult<(Vec<f32>, &str)> {
        let mut last_reason = "no providers configured".to_string();
        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }
            match provider.embed(text) {
                Ok(vector) => return Ok((vector, provider.name())),
                // Malformed input fails the whole chain; a different
                // provider will not fix an unembeddable text.
                Err(e @ EngineError::Validation { .. }) => return Err(e),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                    last_reason = e.to_string();
                }
            }
        }
        Err(EngineError::DependencyUnavailable {
            dependency: "embedding provider",
            reason: last_reason,
        })
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}
