//! Redis-backed cache layer
//!
//! Provides the Redis client with retry logic and the hash-based
//! token store built on top of it.

pub mod redis_client;
pub mod token_store;

pub use redis_client::RedisClient;
pub use token_store::RedisTokenStore;

#[cfg(test)]
mod tests;
