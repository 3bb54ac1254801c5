//! Unit tests for the Redis-backed token store

use ak_core::domain::entities::token::TokenItem;
use ak_core::repositories::token_store::TokenStore;
use ak_core::AuthError;
use ak_shared::CacheConfig;

use crate::cache::redis_client::RedisClient;
use crate::cache::token_store::{namespace_keys, RedisTokenStore};
use crate::InfrastructureError;

fn sample_item(user_name: &str) -> TokenItem {
    TokenItem {
        id: "7001".to_string(),
        expires_at: 4_102_444_800,
        session_id: "session-1".to_string(),
        signed_id: String::new(),
        user_id: 7,
        user_name: user_name.to_string(),
        role: "user".to_string(),
        token: "token-body".to_string(),
        key: "aa".repeat(32),
        client: "ios".to_string(),
    }
}

#[test]
fn test_namespace_keys_without_prefix() {
    let (refresh, access) = namespace_keys(&CacheConfig::default());
    assert_eq!(refresh, "auth:tokens:refresh");
    assert_eq!(access, "auth:tokens:access");
}

#[test]
fn test_namespace_keys_with_prefix() {
    let config = CacheConfig::default().with_prefix("authkit");
    let (refresh, access) = namespace_keys(&config);
    assert_eq!(refresh, "authkit:auth:tokens:refresh");
    assert_eq!(access, "authkit:auth:tokens:access");
}

#[test]
fn test_token_item_json_round_trip() {
    let item = sample_item("alice");
    let payload = serde_json::to_string(&item).unwrap();
    let restored: TokenItem = serde_json::from_str(&payload).unwrap();
    assert_eq!(restored.id, item.id);
    assert_eq!(restored.user_name, "alice");
    assert_eq!(restored.key, item.key);
}

#[test]
fn test_infrastructure_error_converts_to_storage() {
    let err = InfrastructureError::Config("bad url".to_string());
    let auth_err = AuthError::from(err);
    assert!(matches!(auth_err, AuthError::Storage { .. }));
    assert_eq!(auth_err.code(), 812);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_store_round_trip() {
    let config = CacheConfig::from_env().with_prefix("authkit-test");
    let client = RedisClient::new(config).await.unwrap();
    let store = RedisTokenStore::new(client);

    store.purge_all().await.unwrap();

    store.save_refresh("alice", &sample_item("alice")).await.unwrap();
    store.save_access("alice", &sample_item("alice")).await.unwrap();

    let refresh = store.get_refresh("alice").await.unwrap();
    assert!(refresh.is_some());

    // A new refresh save revokes the existing access record.
    store.save_refresh("alice", &sample_item("alice")).await.unwrap();
    assert!(store.get_access("alice").await.unwrap().is_none());

    store.delete_all("alice").await.unwrap();
    assert!(store.get_refresh("alice").await.unwrap().is_none());
}
