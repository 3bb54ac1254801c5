//! Configuration module with service-specific sub-modules
//!
//! - `auth` - Token issuance and validation configuration
//! - `cache` - Redis token store configuration

pub mod auth;
pub mod cache;

use thiserror::Error;

// Re-export commonly used types
pub use auth::AuthConfig;
pub use cache::CacheConfig;

/// Configuration validation failure raised at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration value: {field}")]
    MissingValue { field: String },

    #[error("Configuration value out of range: {field} ({reason})")]
    OutOfRange { field: String, reason: String },
}
