//! Auth token service module
//!
//! This module carries the whole token lifecycle:
//! - Signed token encoding/decoding (codec)
//! - Unique token id generation (snowflake id worker)
//! - Issuance, validation, refresh rotation and revocation (service)

mod codec;
mod id_worker;
mod service;

#[cfg(test)]
mod tests;

pub use codec::{classify, IssueSpec, IssuedToken, TokenCodec};
pub use id_worker::{IdGenerator, SnowflakeIdWorker};
pub use service::{AuthService, NewAuthRequest};

pub use crate::domain::entities::token::AuthTokens;
