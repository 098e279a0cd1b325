//! Deterministic feature-hashing provider.
//!
//! Last-resort fallback and test provider: hashes word unigrams and
//! bigrams into a fixed-width signed feature vector, then L2-normalizes.
//! No model weights, no I/O, always available, and identical text always
//! produces an identical vector.

use hustings_core::errors::{EngineError, EngineResult};
use hustings_core::traits::IEmbeddingProvider;

/// Feature-hashing embedding provider.
pub struct HashingProvider {
    dimensions: usize,
}

impl HashingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn accumulate(&self, features: &mut [f32], token: &str) {
        let digest = blake3::hash(token.as_bytes());
        let bytes = digest.as_bytes();
        let h = u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]);
        let bucket = (h % self.dimensions as u64) as usize;
        // Sign bit from a hash bit outside the bucket range keeps hash
        // collisions from always adding constructively.
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        features[bucket] += sign;
    }
}

impl IEmbeddingProvider for HashingProvider {
    fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        let tokens: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if tokens.is_empty() {
            return Err(EngineError::validation(
                "cannot embed text with no word tokens",
            ));
        }

        let mut features = vec![0.0f32; self.dimensions];
        for token in &tokens {
            self.accumulate(&mut features, token);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut features, &format!("{} {}", pair[0], pair[1]));
        }

        // L2 normalize so cosine comparisons are scale-free.
        let norm: f32 = features.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut features {
                *v /= norm;
            }
        }
        Ok(features)
    }

    fn embed_batch(&self, texts: &[String]) -> EngineResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "feature-hashing"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> HashingProvider {
        HashingProvider::new(384)
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        dot // Inputs are already L2-normalized.
    }

    #[test]
    fn identical_text_embeds_identically() {
        let p = provider();
        let a = p.embed("How will you fix potholes?").unwrap();
        let b = p.embed("How will you fix potholes?").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn output_is_normalized() {
        let p = provider();
        let v = p.embed("what is your housing policy").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn similar_texts_score_higher_than_unrelated() {
        let p = provider();
        let a = p.embed("how will you fix the potholes on main street").unwrap();
        let b = p.embed("how will you fix potholes on our streets").unwrap();
        let c = p.embed("what is your position on school funding").unwrap();
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let p = provider();
        assert!(p.embed("   ").is_err());
    }
}
