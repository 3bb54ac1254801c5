//! Token entities for the paired refresh/access session model.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Subject claim carried by every issued token
pub const TOKEN_SUBJECT: &str = "client";

/// Claims structure for the JWT payload
///
/// Standard claims plus the custom fields that bind a token to a login:
/// the opaque client session id, the identity attributes, and for access
/// tokens the id of the refresh token it was issued alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject
    pub sub: String,

    /// Issued at timestamp (unix seconds)
    pub iat: i64,

    /// Expiration timestamp (unix seconds)
    pub exp: i64,

    /// Not before timestamp (unix seconds)
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID, a generator-issued unique token id
    pub jti: String,

    /// Opaque client-supplied session/device identifier
    pub session_id: String,

    /// User id
    pub user_id: u64,

    /// User name, the key under which token records are stored
    pub user_name: String,

    /// Role attribute, carried for fast lookup by callers
    pub role: String,

    /// For access tokens, the id of the paired refresh token; empty for
    /// refresh tokens
    pub signed_id: String,
}

impl TokenClaims {
    /// Checks whether the expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// True for claims of a refresh token (no pairing id)
    pub fn is_refresh(&self) -> bool {
        self.signed_id.is_empty()
    }
}

/// The persisted record for one issued token
///
/// At most one refresh record and one access record exist per user name;
/// that keying is what makes the system single-session-per-user. The
/// `token` field is the source of truth for "is this still the active
/// token".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenItem {
    /// Unique token id (generator-issued), doubles as the JWT `jti`
    pub id: String,

    /// Unix seconds, equal to the token's encoded expiry
    pub expires_at: i64,

    /// Opaque client-supplied session/device identifier
    pub session_id: String,

    /// For an access record, the id of the refresh record it was issued
    /// alongside; empty for refresh records
    pub signed_id: String,

    /// User id
    pub user_id: u64,

    /// User name the record is keyed by
    pub user_name: String,

    /// Role attribute
    pub role: String,

    /// The full signed token string
    pub token: String,

    /// Per-login symmetric secret (hex-encoded), shared by both tokens of
    /// a pair, handed to callers for downstream payload encryption
    pub key: String,

    /// Caller-supplied client/device label, carried through unchecked
    pub client: String,
}

impl TokenItem {
    /// Checks whether the record's expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.expires_at
    }
}

/// Token pair returned to the caller after issuance or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Long-lived credential authorizing future refreshes
    pub refresh_token: String,

    /// Per-login symmetric secret (hex-encoded)
    pub key: String,

    /// Short-lived credential presented on ordinary requests
    pub access_token: String,
}
