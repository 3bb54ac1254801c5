//! Business services.

pub mod auth;

pub use auth::{AuthService, AuthTokens, IdGenerator, NewAuthRequest, SnowflakeIdWorker, TokenCodec};
