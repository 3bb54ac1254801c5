//! Auth service orchestrating issuance, validation, refresh and revocation.

use std::sync::Arc;

use ak_shared::{AuthConfig, ConfigError};
use chrono::Utc;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::domain::entities::token::{AuthTokens, TokenItem};
use crate::errors::{AuthError, AuthResult};
use crate::repositories::TokenStore;

use super::codec::{IssueSpec, TokenCodec};
use super::id_worker::{IdGenerator, SnowflakeIdWorker};

/// Parameters for a full login
#[derive(Debug, Clone)]
pub struct NewAuthRequest {
    /// Service-to-service trust credential
    pub auth_code: String,
    /// Opaque client-supplied session/device identifier
    pub session_id: String,
    pub user_id: u64,
    pub user_name: String,
    pub role: String,
    /// Client/device label, carried through unchecked
    pub client: String,
}

/// The auth token service
///
/// Stateless compute over the injected token store: no in-process
/// locking, no background work. Token expiry is checked lazily on
/// access. Concurrent logins for the same user race by design; the last
/// writer wins both slots.
pub struct AuthService<S: TokenStore> {
    store: S,
    codec: TokenCodec,
    config: AuthConfig,
}

impl<S: TokenStore> AuthService<S> {
    /// Create a service with explicit dependencies
    ///
    /// The configuration is taken as given; validate it at startup with
    /// [`AuthConfig::validate`] or use [`AuthService::from_config`].
    pub fn new(store: S, config: AuthConfig, id_generator: Arc<dyn IdGenerator>) -> Self {
        let codec = TokenCodec::new(&config.token_secret, &config.token_issuer, id_generator);
        Self {
            store,
            codec,
            config,
        }
    }

    /// Validate the configuration and wire the default snowflake id worker
    pub fn from_config(store: S, config: AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.is_using_default_secret() {
            warn!("auth service running with the default token secret");
        }
        let id_generator = Arc::new(SnowflakeIdWorker::new(config.worker_id)?);
        Ok(Self::new(store, config, id_generator))
    }

    /// Full login: issue a fresh (refresh, access) pair for a user
    ///
    /// Any previously active session for the user is invalidated the
    /// moment the new refresh record is saved, regardless of which device
    /// held it. A crash between the two saves leaves the user with a
    /// refresh record and no access record; the only recovery from that
    /// window is another login.
    pub async fn new_auth(&self, request: &NewAuthRequest) -> AuthResult<AuthTokens> {
        if request.auth_code != self.config.auth_code {
            return Err(AuthError::AuthCodeWrong);
        }

        // Refresh token
        let issued_refresh = self.codec.issue(IssueSpec {
            session_id: &request.session_id,
            user_id: request.user_id,
            user_name: &request.user_name,
            role: &request.role,
            signed_id: "",
            lifetime: self.config.refresh_token_lifetime,
        })?;
        let key = generate_session_key();
        let refresh_item = TokenItem {
            id: issued_refresh.id.clone(),
            expires_at: issued_refresh.expires_at,
            session_id: request.session_id.clone(),
            signed_id: String::new(),
            user_id: request.user_id,
            user_name: request.user_name.clone(),
            role: request.role.clone(),
            token: issued_refresh.token,
            key: key.clone(),
            client: request.client.clone(),
        };
        if let Err(e) = self.store.save_refresh(&request.user_name, &refresh_item).await {
            warn!(user_name = %request.user_name, error = %e, "refresh token save failed");
            return Err(AuthError::TokenSaveFailed);
        }

        // Access token, bound to the refresh token just stored
        let issued_access = self.codec.issue(IssueSpec {
            session_id: &request.session_id,
            user_id: request.user_id,
            user_name: &request.user_name,
            role: &request.role,
            signed_id: &issued_refresh.id,
            lifetime: self.config.access_token_lifetime,
        })?;
        let access_item = TokenItem {
            id: issued_access.id,
            expires_at: issued_access.expires_at,
            session_id: request.session_id.clone(),
            signed_id: issued_refresh.id,
            user_id: request.user_id,
            user_name: request.user_name.clone(),
            role: request.role.clone(),
            token: issued_access.token,
            key: key.clone(),
            client: request.client.clone(),
        };
        if let Err(e) = self.store.save_access(&request.user_name, &access_item).await {
            warn!(user_name = %request.user_name, error = %e, "access token save failed");
            return Err(AuthError::TokenSaveFailed);
        }

        info!(user_name = %request.user_name, session_id = %request.session_id, "issued new token pair");
        Ok(AuthTokens {
            refresh_token: refresh_item.token,
            key,
            access_token: access_item.token,
        })
    }

    /// Validate an access token and return its stored record
    ///
    /// A token that parses but no longer matches the stored slot is
    /// stale: `OtherDeviceLogin` when a different session owns the slot,
    /// `TokenCheckFailed` otherwise.
    pub async fn access_token_auth(&self, access_token: &str) -> AuthResult<TokenItem> {
        let claims = self.codec.parse(access_token)?;

        let stored = self
            .store
            .get_access(&claims.user_name)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if stored.token != access_token {
            if claims.session_id != stored.session_id {
                return Err(AuthError::OtherDeviceLogin);
            }
            return Err(AuthError::TokenCheckFailed);
        }
        Ok(stored)
    }

    /// Rotate an expired access token into a brand-new pair
    ///
    /// Only proceeds when validation failed with exactly
    /// `TokenShouldRefresh`; a still-valid access token is refused with
    /// `ShouldNotRefresh`. Identity is recovered from the expired token
    /// through the codec's expiry-tolerant parse mode.
    pub async fn auth_refresh(&self, access_token: &str) -> AuthResult<AuthTokens> {
        match self.access_token_auth(access_token).await {
            Ok(_) => return Err(AuthError::ShouldNotRefresh),
            Err(AuthError::TokenShouldRefresh) => {}
            Err(e) => return Err(e),
        }
        // Signature and issuer were verified above; only expiry is
        // tolerated here.
        let access_claims = self.codec.parse_expired(access_token)?;

        let refresh = self
            .store
            .get_refresh(&access_claims.user_name)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if Utc::now().timestamp() > refresh.expires_at {
            debug!(user_name = %refresh.user_name, "refresh token expired, forcing re-login");
            if let Err(e) = self.store.delete_refresh(&refresh.user_name).await {
                warn!(user_name = %refresh.user_name, error = %e, "expired refresh cleanup failed");
            }
            return Err(AuthError::TokenTimeout);
        }

        // Parse the stored refresh token itself, guarding against a
        // corrupted or forged record.
        let refresh_claims = self.codec.parse(&refresh.token)?;

        if refresh.id != access_claims.signed_id {
            if access_claims.session_id != refresh.session_id {
                return Err(AuthError::OtherDeviceLogin);
            }
            return Err(AuthError::TokenCheckFailed);
        }

        // Re-issue from the stored refresh record, not from request
        // values.
        let request = NewAuthRequest {
            auth_code: self.config.auth_code.clone(),
            session_id: refresh.session_id.clone(),
            user_id: refresh_claims.user_id,
            user_name: refresh.user_name.clone(),
            role: refresh.role.clone(),
            client: refresh.client.clone(),
        };
        self.new_auth(&request).await
    }

    /// Explicit logout / administrative revocation of both tokens
    pub async fn del_auth(&self, auth_code: &str, user_name: &str) -> AuthResult<bool> {
        if auth_code != self.config.auth_code {
            return Err(AuthError::AuthCodeWrong);
        }
        self.store.delete_all(user_name).await?;
        info!(user_name = %user_name, "revoked token pair");
        Ok(true)
    }

    /// Read the per-login symmetric key for a user's active session
    pub async fn get_key(&self, user_name: &str) -> AuthResult<String> {
        self.store
            .get_key(user_name)
            .await?
            .ok_or(AuthError::TokenNotFound)
    }
}

/// Fresh per-login symmetric secret: 32 random bytes, hex-encoded
fn generate_session_key() -> String {
    let mut key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    hex::encode(key)
}
