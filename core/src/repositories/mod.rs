//! Persistence abstractions for issued token records.

pub mod token_store;

pub use token_store::{MemoryTokenStore, TokenStore};
