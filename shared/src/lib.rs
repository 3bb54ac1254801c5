//! Shared utilities and common types for AuthKit services
//!
//! This crate provides functionality used across the workspace:
//! - Configuration types for the auth service and its cache backend
//! - The error response structure crossed over the service boundary

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{AuthConfig, CacheConfig, ConfigError};
pub use errors::ErrorResponse;
