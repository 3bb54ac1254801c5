//! Redis-backed token store
//!
//! Persists token records as JSON inside two Redis hashes, one per
//! namespace, with the user name as the hash field. The hash layout
//! keeps per-user lookups O(1) and lets the administrative purge
//! enumerate fields without scanning the keyspace.

use async_trait::async_trait;
use tracing::debug;

use ak_core::domain::entities::token::TokenItem;
use ak_core::errors::AuthResult;
use ak_core::repositories::token_store::TokenStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Hash holding the current refresh record per user
const REFRESH_NAMESPACE: &str = "auth:tokens:refresh";
/// Hash holding the current access record per user
const ACCESS_NAMESPACE: &str = "auth:tokens:access";

/// Token store persisting records in Redis hashes
#[derive(Clone)]
pub struct RedisTokenStore {
    client: RedisClient,
    refresh_key: String,
    access_key: String,
}

impl RedisTokenStore {
    /// Create a store over an existing Redis client
    ///
    /// The hash keys are derived from the client's configured key
    /// prefix, so two deployments can share one Redis instance.
    pub fn new(client: RedisClient) -> Self {
        let (refresh_key, access_key) = namespace_keys(client.config());
        Self {
            client,
            refresh_key,
            access_key,
        }
    }

    async fn put(
        &self,
        key: &str,
        user_name: &str,
        item: &TokenItem,
    ) -> Result<(), InfrastructureError> {
        let payload = serde_json::to_string(item)?;
        self.client.hash_set(key, user_name, &payload).await
    }

    async fn fetch(
        &self,
        key: &str,
        user_name: &str,
    ) -> Result<Option<TokenItem>, InfrastructureError> {
        match self.client.hash_get(key, user_name).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn wipe_namespace(&self, key: &str) -> Result<(), InfrastructureError> {
        let fields = self.client.hash_keys(key).await?;
        for field in fields {
            self.client.hash_delete(key, &field).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn save_refresh(&self, user_name: &str, item: &TokenItem) -> AuthResult<()> {
        debug!("Saving refresh record for user '{}'", user_name);
        // Revoke the stale access record before the refresh slot is
        // overwritten; between the two writes the user has no valid pair.
        self.client
            .hash_delete(&self.access_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)?;
        self.put(&self.refresh_key, user_name, item)
            .await
            .map_err(ak_core::AuthError::from)
    }

    async fn get_refresh(&self, user_name: &str) -> AuthResult<Option<TokenItem>> {
        self.fetch(&self.refresh_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)
    }

    async fn delete_refresh(&self, user_name: &str) -> AuthResult<()> {
        debug!("Deleting refresh record for user '{}'", user_name);
        self.client
            .hash_delete(&self.refresh_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)?;
        self.client
            .hash_delete(&self.access_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)?;
        Ok(())
    }

    async fn save_access(&self, user_name: &str, item: &TokenItem) -> AuthResult<()> {
        debug!("Saving access record for user '{}'", user_name);
        self.put(&self.access_key, user_name, item)
            .await
            .map_err(ak_core::AuthError::from)
    }

    async fn get_access(&self, user_name: &str) -> AuthResult<Option<TokenItem>> {
        self.fetch(&self.access_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)
    }

    async fn delete_access(&self, user_name: &str) -> AuthResult<()> {
        debug!("Deleting access record for user '{}'", user_name);
        self.client
            .hash_delete(&self.access_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)?;
        Ok(())
    }

    async fn delete_all(&self, user_name: &str) -> AuthResult<()> {
        debug!("Deleting all records for user '{}'", user_name);
        self.client
            .hash_delete(&self.refresh_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)?;
        self.client
            .hash_delete(&self.access_key, user_name)
            .await
            .map_err(ak_core::AuthError::from)?;
        Ok(())
    }

    async fn purge_all(&self) -> AuthResult<()> {
        debug!("Purging all token records");
        self.wipe_namespace(&self.refresh_key)
            .await
            .map_err(ak_core::AuthError::from)?;
        self.wipe_namespace(&self.access_key)
            .await
            .map_err(ak_core::AuthError::from)?;
        Ok(())
    }
}

/// Compute the hash keys a store would use for a given prefix
///
/// Split out so key derivation is testable without a live connection.
pub(crate) fn namespace_keys(config: &ak_shared::CacheConfig) -> (String, String) {
    (
        config.make_key(REFRESH_NAMESPACE),
        config.make_key(ACCESS_NAMESPACE),
    )
}
