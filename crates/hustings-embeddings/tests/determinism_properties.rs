//! Property tests: the hashing provider must be deterministic and
//! normalized for arbitrary word soup.

use hustings_core::traits::IEmbeddingProvider;
use hustings_embeddings::HashingProvider;
use proptest::prelude::*;

proptest! {
    #[test]
    fn embedding_is_deterministic(words in prop::collection::vec("[a-z]{1,12}", 1..40)) {
        let text = words.join(" ");
        let provider = HashingProvider::new(384);
        let a = provider.embed(&text).unwrap();
        let b = provider.embed(&text).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn embedding_is_unit_length(words in prop::collection::vec("[a-z]{1,12}", 1..40)) {
        let text = words.join(" ");
        let provider = HashingProvider::new(384);
        let v = provider.embed(&text).unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        prop_assert!((norm - 1.0).abs() < 1e-4);
    }
}
