//! Token store trait defining the persistence contract for token records.

use async_trait::async_trait;

use crate::domain::entities::token::TokenItem;
use crate::errors::AuthResult;

/// Keyed persistence for the current refresh and access record per user
///
/// Two fixed namespaces (`refresh`, `access`) with the user name as field.
/// Each individual operation is atomic at the storage layer, but the
/// multi-step sequences the auth service runs on top are not; a crash
/// between saving a refresh record and its access record leaves the user
/// with a refresh token only, recoverable by a fresh login.
///
/// Implementations must provide at least read-your-writes consistency for
/// a single key.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Save the refresh record for a user, replacing any previous one
    ///
    /// Deletes the user's existing access record first: a new login
    /// revokes the previously issued access token before the new one is
    /// ready. The sequencing is part of the contract.
    async fn save_refresh(&self, user_name: &str, item: &TokenItem) -> AuthResult<()>;

    /// Load the refresh record for a user
    async fn get_refresh(&self, user_name: &str) -> AuthResult<Option<TokenItem>>;

    /// Delete the refresh record for a user, cascading to the paired
    /// access record
    async fn delete_refresh(&self, user_name: &str) -> AuthResult<()>;

    /// Save the access record for a user, replacing any previous one
    async fn save_access(&self, user_name: &str, item: &TokenItem) -> AuthResult<()>;

    /// Load the access record for a user
    async fn get_access(&self, user_name: &str) -> AuthResult<Option<TokenItem>>;

    /// Delete the access record for a user
    async fn delete_access(&self, user_name: &str) -> AuthResult<()>;

    /// Delete both records for a user (bulk revoke)
    async fn delete_all(&self, user_name: &str) -> AuthResult<()>;

    /// Read the per-login symmetric key from the user's refresh record
    async fn get_key(&self, user_name: &str) -> AuthResult<Option<String>> {
        Ok(self.get_refresh(user_name).await?.map(|item| item.key))
    }

    /// Administrative wipe of both namespaces, off the hot path
    async fn purge_all(&self) -> AuthResult<()>;
}
