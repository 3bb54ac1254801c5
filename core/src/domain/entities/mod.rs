//! Domain entities representing issued tokens and their claims.

pub mod token;

// Re-export commonly used types
pub use token::{AuthTokens, TokenClaims, TokenItem, TOKEN_SUBJECT};
