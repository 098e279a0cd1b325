/// Engine version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dimensionality of question embeddings.
pub const EMBEDDING_DIMENSIONS: usize = 384;

/// Version numbers are monotonic and start here.
pub const FIRST_VERSION_NUMBER: u32 = 1;

/// Maximum questions re-embedded per maintenance pass.
pub const MAX_BACKFILL_BATCH: usize = 256;

/// Maximum pending-index entries drained per maintenance pass.
pub const MAX_INDEX_DRAIN_BATCH: usize = 512;
