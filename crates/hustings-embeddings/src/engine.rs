//! EmbeddingEngine — provider chain plus an L1 cache keyed by blake3
//! text hash. Implements `IEmbeddingProvider` so callers depend only on
//! the trait.

use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, info};

use hustings_core::errors::EngineResult;
use hustings_core::traits::IEmbeddingProvider;

use crate::chain::ProviderChain;

/// Entries kept in the L1 embedding cache.
const L1_CACHE_CAPACITY: u64 = 4096;

/// The main embedding engine.
pub struct EmbeddingEngine {
    chain: ProviderChain,
    cache: Cache<String, Arc<Vec<f32>>>,
    dimensions: usize,
}

impl EmbeddingEngine {
    /// Build an engine from an ordered provider chain.
    pub fn new(chain: ProviderChain, dimensions: usize) -> Self {
        info!(
            provider = chain.active_provider_name(),
            dims = dimensions,
            "embedding engine initialized"
        );
        Self {
            chain,
            cache: Cache::new(L1_CACHE_CAPACITY),
            dimensions,
        }
    }

    /// An engine backed only by the deterministic hashing provider.
    pub fn with_hashing_provider(dimensions: usize) -> Self {
        let mut chain = ProviderChain::new();
        chain.push(Box::new(crate::providers::HashingProvider::new(dimensions)));
        Self::new(chain, dimensions)
    }

    /// Embed a text with caching.
    pub fn embed_text(&self, text: &str) -> EngineResult<Vec<f32>> {
        let key = blake3::hash(text.as_bytes()).to_hex().to_string();
        if let Some(cached) = self.cache.get(&key) {
            debug!(hash = %key, "embedding cache hit");
            return Ok(cached.as_ref().clone());
        }

        let (vector, provider) = self.chain.embed(text)?;
        debug!(provider, dims = vector.len(), "embedded text");
        self.cache.insert(key, Arc::new(vector.clone()));
        Ok(vector)
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        self.embed_text(text)
    }

    fn embed_batch(&self, texts: &[String]) -> EngineResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hustings-embedding-engine"
    }

    fn is_available(&self) -> bool {
        self.chain.active_provider_name() != "none"
    }
}
