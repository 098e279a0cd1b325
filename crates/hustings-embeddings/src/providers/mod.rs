pub mod hashing;

pub use hashing::HashingProvider;
