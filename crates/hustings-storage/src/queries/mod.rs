pub mod answer_ops;
pub mod cluster_ops;
pub mod index_queue;
pub mod question_crud;
pub mod version_ops;
pub mod vote_ops;
