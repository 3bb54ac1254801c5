//! Unit tests for the auth service

use std::sync::Arc;

use ak_shared::AuthConfig;

use crate::errors::AuthError;
use crate::repositories::{MemoryTokenStore, TokenStore};
use crate::services::auth::{AuthService, NewAuthRequest, SnowflakeIdWorker};

const AUTH_CODE: &str = "this is auth code for validate";

fn test_config() -> AuthConfig {
    AuthConfig::new("thisnand!abn", AUTH_CODE)
        .with_issuer("authkit/test")
        .with_refresh_lifetime(120)
        .with_access_lifetime(30)
}

/// Service whose access tokens are born expired, so refresh paths can be
/// exercised without waiting out a lifetime.
fn expired_access_config() -> AuthConfig {
    test_config().with_access_lifetime(-30)
}

fn service_with(config: AuthConfig) -> AuthService<MemoryTokenStore> {
    AuthService::new(
        MemoryTokenStore::new(),
        config,
        Arc::new(SnowflakeIdWorker::new(3).unwrap()),
    )
}

fn login(session_id: &str, user_name: &str, client: &str) -> NewAuthRequest {
    NewAuthRequest {
        auth_code: AUTH_CODE.to_string(),
        session_id: session_id.to_string(),
        user_id: 7,
        user_name: user_name.to_string(),
        role: "user".to_string(),
        client: client.to_string(),
    }
}

#[tokio::test]
async fn test_new_auth_rejects_wrong_auth_code() {
    let service = service_with(test_config());
    let mut request = login("s1", "alice", "iOS");
    request.auth_code = "wrong".to_string();

    assert_eq!(
        service.new_auth(&request).await,
        Err(AuthError::AuthCodeWrong)
    );
}

// After a login the access token validates and the record carries the
// identity attributes and the pair key.
#[tokio::test]
async fn test_new_auth_then_access_token_auth() {
    let service = service_with(test_config());
    let tokens = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    assert!(!tokens.refresh_token.is_empty());
    assert!(!tokens.access_token.is_empty());
    assert_eq!(tokens.key.len(), 64); // 32 bytes, hex-encoded

    let item = service.access_token_auth(&tokens.access_token).await.unwrap();
    assert_eq!(item.user_name, "alice");
    assert_eq!(item.user_id, 7);
    assert_eq!(item.role, "user");
    assert_eq!(item.key, tokens.key);
    assert_eq!(item.client, "iOS");
}

#[tokio::test]
async fn test_pair_is_bound_by_signed_id() {
    let config = test_config();
    let store = MemoryTokenStore::new();
    let service = AuthService::new(
        store.clone(),
        config,
        Arc::new(SnowflakeIdWorker::new(3).unwrap()),
    );
    service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    let refresh = store.get_refresh("alice").await.unwrap().unwrap();
    let access = store.get_access("alice").await.unwrap().unwrap();
    assert!(refresh.signed_id.is_empty());
    assert_eq!(access.signed_id, refresh.id);
    assert_eq!(access.key, refresh.key);
}

// A second login pre-empts the first; the mismatch is reported as
// OtherDeviceLogin only when the session differs.
#[tokio::test]
async fn test_second_login_other_device() {
    let service = service_with(test_config());
    let first = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();
    let second = service
        .new_auth(&login("s2", "alice", "android"))
        .await
        .unwrap();

    assert_eq!(
        service.access_token_auth(&first.access_token).await,
        Err(AuthError::OtherDeviceLogin)
    );
    assert!(service.access_token_auth(&second.access_token).await.is_ok());
}

#[tokio::test]
async fn test_second_login_same_session_is_generic_failure() {
    let service = service_with(test_config());
    let first = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();
    service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    assert_eq!(
        service.access_token_auth(&first.access_token).await,
        Err(AuthError::TokenCheckFailed)
    );
}

// A still-valid access token must not be refreshed.
#[tokio::test]
async fn test_refresh_of_valid_token_rejected() {
    let service = service_with(test_config());
    let tokens = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    assert_eq!(
        service.auth_refresh(&tokens.access_token).await,
        Err(AuthError::ShouldNotRefresh)
    );
}

// An expired access token rotates into a fresh pair, and the old pair
// cannot be replayed.
#[tokio::test]
async fn test_refresh_rotation() {
    let service = service_with(expired_access_config());
    let old = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    let new = service.auth_refresh(&old.access_token).await.unwrap();
    assert_ne!(new.access_token, old.access_token);
    assert_ne!(new.refresh_token, old.refresh_token);
    assert_ne!(new.key, old.key);

    // The superseded access token no longer pairs with the stored
    // refresh token; replaying it is refused.
    assert_eq!(
        service.auth_refresh(&old.access_token).await,
        Err(AuthError::TokenCheckFailed)
    );
}

#[tokio::test]
async fn test_refresh_keeps_identity_and_session() {
    let config = expired_access_config();
    let store = MemoryTokenStore::new();
    let service = AuthService::new(
        store.clone(),
        config,
        Arc::new(SnowflakeIdWorker::new(3).unwrap()),
    );
    let old = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();
    service.auth_refresh(&old.access_token).await.unwrap();

    let refresh = store.get_refresh("alice").await.unwrap().unwrap();
    assert_eq!(refresh.user_name, "alice");
    assert_eq!(refresh.user_id, 7);
    assert_eq!(refresh.session_id, "s1");
    assert_eq!(refresh.client, "iOS");
}

#[tokio::test]
async fn test_refresh_after_other_device_login() {
    let service = service_with(expired_access_config());
    let first = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();
    service
        .new_auth(&login("s2", "alice", "android"))
        .await
        .unwrap();

    // The first device's expired access token is no longer paired with
    // the stored refresh token, and the session differs.
    assert_eq!(
        service.auth_refresh(&first.access_token).await,
        Err(AuthError::OtherDeviceLogin)
    );
}

// Once the refresh token itself has expired, refresh forces a full
// re-login and the records are gone.
#[tokio::test]
async fn test_refresh_token_timeout() {
    let config = expired_access_config().with_refresh_lifetime(-60);
    let service = service_with(config);
    let tokens = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    assert_eq!(
        service.auth_refresh(&tokens.access_token).await,
        Err(AuthError::TokenTimeout)
    );

    // Cleanup removed both records; everything after is not-found.
    assert_eq!(
        service.access_token_auth(&tokens.access_token).await,
        Err(AuthError::TokenNotFound)
    );
    assert_eq!(
        service.auth_refresh(&tokens.access_token).await,
        Err(AuthError::TokenNotFound)
    );
}

// Revocation removes both tokens.
#[tokio::test]
async fn test_del_auth_revokes_both() {
    let service = service_with(test_config());
    let tokens = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    assert_eq!(service.del_auth(AUTH_CODE, "alice").await, Ok(true));
    assert_eq!(
        service.access_token_auth(&tokens.access_token).await,
        Err(AuthError::TokenNotFound)
    );
    assert_eq!(
        service.get_key("alice").await,
        Err(AuthError::TokenNotFound)
    );
}

#[tokio::test]
async fn test_del_auth_rejects_wrong_auth_code() {
    let service = service_with(test_config());
    service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    assert_eq!(
        service.del_auth("wrong", "alice").await,
        Err(AuthError::AuthCodeWrong)
    );
    assert!(service.get_key("alice").await.is_ok());
}

#[tokio::test]
async fn test_access_token_auth_propagates_parse_errors() {
    let service = service_with(test_config());
    assert_eq!(
        service.access_token_auth("").await,
        Err(AuthError::TokenEmpty)
    );
    assert_eq!(
        service.access_token_auth("garbage").await,
        Err(AuthError::TokenCheckFailed)
    );
}

// A refresh record with no access record (crash between the two saves)
// cannot self-heal through refresh; only a fresh login recovers.
#[tokio::test]
async fn test_refresh_without_access_record_is_not_self_healing() {
    let store = MemoryTokenStore::new();
    let service = AuthService::new(
        store.clone(),
        test_config(),
        Arc::new(SnowflakeIdWorker::new(3).unwrap()),
    );
    let tokens = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();

    // Simulate the crash window: the access record never landed.
    store.delete_access("alice").await.unwrap();

    assert_eq!(
        service.access_token_auth(&tokens.access_token).await,
        Err(AuthError::TokenNotFound)
    );
    assert_eq!(
        service.auth_refresh(&tokens.access_token).await,
        Err(AuthError::TokenNotFound)
    );

    // A fresh login is the recovery path.
    let recovered = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();
    assert!(service.access_token_auth(&recovered.access_token).await.is_ok());
}

// Concurrent logins race by design (last writer wins). After the race a
// serial login always restores one consistent pair; a mixed pair from two
// different logins must never validate.
#[tokio::test]
async fn test_concurrent_logins_settle_consistently() {
    let store = MemoryTokenStore::new();
    let service = Arc::new(AuthService::new(
        store.clone(),
        test_config(),
        Arc::new(SnowflakeIdWorker::new(3).unwrap()),
    ));

    let a = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.new_auth(&login("s1", "alice", "iOS")).await })
    };
    let b = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.new_auth(&login("s2", "alice", "android")).await })
    };
    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();

    // Whatever interleaving happened, a token that still validates must
    // belong to the pair the store currently holds.
    for tokens in [&a, &b] {
        if let Ok(item) = service.access_token_auth(&tokens.access_token).await {
            let refresh = store.get_refresh("alice").await.unwrap().unwrap();
            assert_eq!(item.signed_id, refresh.id);
            assert_eq!(item.key, refresh.key);
            assert_eq!(item.session_id, refresh.session_id);
        }
    }

    // A subsequent serial login settles the slots into one pair.
    let settled = service.new_auth(&login("s3", "alice", "web")).await.unwrap();
    let refresh = store.get_refresh("alice").await.unwrap().unwrap();
    let access = store.get_access("alice").await.unwrap().unwrap();
    assert_eq!(access.signed_id, refresh.id);
    assert_eq!(access.key, refresh.key);
    assert_eq!(access.session_id, "s3");
    assert!(service.access_token_auth(&settled.access_token).await.is_ok());
}

// The two-device login story, end to end.
#[tokio::test]
async fn test_scenario_walkthrough() {
    let service = service_with(test_config());

    let first = service.new_auth(&login("s1", "alice", "iOS")).await.unwrap();
    let item = service.access_token_auth(&first.access_token).await.unwrap();
    assert_eq!(item.user_name, "alice");

    let second = service
        .new_auth(&login("s2", "alice", "android"))
        .await
        .unwrap();
    assert_eq!(
        service.access_token_auth(&first.access_token).await,
        Err(AuthError::OtherDeviceLogin)
    );
    let item = service.access_token_auth(&second.access_token).await.unwrap();
    assert_eq!(item.session_id, "s2");
    assert_eq!(item.client, "android");
}

#[tokio::test]
async fn test_from_config_validates() {
    let mut config = test_config();
    config.token_secret = String::new();
    assert!(AuthService::from_config(MemoryTokenStore::new(), config).is_err());

    assert!(AuthService::from_config(MemoryTokenStore::new(), test_config()).is_ok());
}
