//! # AuthKit Infrastructure
//!
//! Redis-backed implementation of the core token store.

pub mod cache;

use thiserror::Error;

pub use cache::{RedisClient, RedisTokenStore};

/// Infrastructure-level failures
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfrastructureError> for ak_core::AuthError {
    fn from(err: InfrastructureError) -> Self {
        ak_core::AuthError::Storage {
            message: err.to_string(),
        }
    }
}
