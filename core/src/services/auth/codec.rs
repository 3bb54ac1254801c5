//! Signed token codec: claims encoding, strict and expiry-tolerant parsing.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::{TokenClaims, TOKEN_SUBJECT};
use crate::errors::{AuthError, AuthResult};

use super::id_worker::IdGenerator;

/// Inputs for issuing one signed token
#[derive(Debug, Clone)]
pub struct IssueSpec<'a> {
    pub session_id: &'a str,
    pub user_id: u64,
    pub user_name: &'a str,
    pub role: &'a str,
    /// Id of the paired refresh token for access tokens, empty otherwise
    pub signed_id: &'a str,
    /// Token lifetime in seconds
    pub lifetime: i64,
}

/// A freshly signed token with the id and expiry that went into it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub id: String,
    pub expires_at: i64,
}

/// Encoder/decoder for signed tokens, independent of storage
///
/// Signing is symmetric (HS256). Parsing comes in two modes: `parse`
/// rejects expired tokens with the distinct `TokenShouldRefresh` signal,
/// while `parse_expired` tolerates expiry but still enforces signature,
/// issuer, token id and issued-at checks, so identity can be recovered
/// from an expired access token during refresh.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    id_generator: Arc<dyn IdGenerator>,
}

impl TokenCodec {
    /// Create a codec for the given signing secret and issuer
    pub fn new(secret: &str, issuer: &str, id_generator: Arc<dyn IdGenerator>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["iss", "exp"]);
        // Expiry is checked manually so one decode path serves both
        // parse modes.
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.to_string(),
            id_generator,
        }
    }

    /// Build and sign a token, returning the string and the jti/expiry used
    pub fn issue(&self, spec: IssueSpec<'_>) -> AuthResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let expires_at = now + spec.lifetime;
        let id = self.id_generator.next_id().to_string();

        let claims = TokenClaims {
            sub: TOKEN_SUBJECT.to_string(),
            iat: now,
            exp: expires_at,
            nbf: now,
            iss: self.issuer.clone(),
            jti: id.clone(),
            session_id: spec.session_id.to_string(),
            user_id: spec.user_id,
            user_name: spec.user_name.to_string(),
            role: spec.role.to_string(),
            signed_id: spec.signed_id.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerateFailed)?;

        Ok(IssuedToken {
            token,
            id,
            expires_at,
        })
    }

    /// Strict parse: expired tokens are rejected with `TokenShouldRefresh`
    ///
    /// The distinction from `TokenCheckFailed` is load-bearing; the
    /// refresh flow branches on it.
    pub fn parse(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims = self.decode_claims(token)?;
        if Utc::now().timestamp() > claims.exp {
            return Err(AuthError::TokenShouldRefresh);
        }
        Ok(claims)
    }

    /// Expiry-tolerant parse: signature, issuer, token id and issued-at
    /// are still enforced, but claims come back even past expiry
    pub fn parse_expired(&self, token: &str) -> AuthResult<TokenClaims> {
        self.decode_claims(token)
    }

    fn decode_claims(&self, token: &str) -> AuthResult<TokenClaims> {
        if token.is_empty() {
            return Err(AuthError::TokenEmpty);
        }

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(&e))?;
        let claims = data.claims;

        if claims.jti.is_empty() {
            return Err(AuthError::TokenCheckFailed);
        }
        if claims.iat > Utc::now().timestamp() {
            return Err(AuthError::TokenCheckFailed);
        }
        Ok(claims)
    }
}

/// Map a raw JWT library error onto the domain taxonomy
///
/// Pure function so the mapping stays testable without signing anything.
pub fn classify(err: &jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenShouldRefresh,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => AuthError::TokenTypeWrong,
        _ => AuthError::TokenCheckFailed,
    }
}
