//! In-memory token store backed by hash maps.
//!
//! The embedded backend: selected at construction time for single-process
//! deployments and used as the store in unit tests. Semantics match the
//! Redis-backed store, including the delete-access-first sequencing of
//! `save_refresh`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::TokenItem;
use crate::errors::AuthResult;

use super::r#trait::TokenStore;

/// Token store over two in-process hash maps
#[derive(Clone)]
pub struct MemoryTokenStore {
    refresh: Arc<RwLock<HashMap<String, TokenItem>>>,
    access: Arc<RwLock<HashMap<String, TokenItem>>>,
}

impl MemoryTokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            refresh: Arc::new(RwLock::new(HashMap::new())),
            access: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_refresh(&self, user_name: &str, item: &TokenItem) -> AuthResult<()> {
        // The stale access record goes first, then the refresh slot is
        // overwritten; between the two writes the user has no valid pair.
        self.access.write().await.remove(user_name);
        self.refresh
            .write()
            .await
            .insert(user_name.to_string(), item.clone());
        Ok(())
    }

    async fn get_refresh(&self, user_name: &str) -> AuthResult<Option<TokenItem>> {
        Ok(self.refresh.read().await.get(user_name).cloned())
    }

    async fn delete_refresh(&self, user_name: &str) -> AuthResult<()> {
        self.refresh.write().await.remove(user_name);
        self.access.write().await.remove(user_name);
        Ok(())
    }

    async fn save_access(&self, user_name: &str, item: &TokenItem) -> AuthResult<()> {
        self.access
            .write()
            .await
            .insert(user_name.to_string(), item.clone());
        Ok(())
    }

    async fn get_access(&self, user_name: &str) -> AuthResult<Option<TokenItem>> {
        Ok(self.access.read().await.get(user_name).cloned())
    }

    async fn delete_access(&self, user_name: &str) -> AuthResult<()> {
        self.access.write().await.remove(user_name);
        Ok(())
    }

    async fn delete_all(&self, user_name: &str) -> AuthResult<()> {
        self.refresh.write().await.remove(user_name);
        self.access.write().await.remove(user_name);
        Ok(())
    }

    async fn purge_all(&self) -> AuthResult<()> {
        self.refresh.write().await.clear();
        self.access.write().await.clear();
        Ok(())
    }
}
