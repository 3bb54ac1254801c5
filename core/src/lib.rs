//! # AuthKit Core
//!
//! The auth token service: issues, validates, rotates and revokes paired
//! refresh/access tokens for end-user sessions, and enforces a
//! single-active-session-per-user policy with device mismatch detection.
//! Transport layers (HTTP/RPC) are external callers of this crate.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
