pub mod embedding;
pub mod index;
pub mod storage;
pub mod strategy;

pub use embedding::IEmbeddingProvider;
pub use index::IVectorIndex;
pub use storage::{
    ClusterPlacement, CounterSnapshot, IQuestionStorage, PendingIndexEntry, VoteWrite,
};
pub use strategy::IRankStrategy;
