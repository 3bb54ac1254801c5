//! Redis cache client
//!
//! Thin async client over a multiplexed Redis connection with retry
//! logic. Exposes the hash operations the token store is built on,
//! plus a PING-based health check.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use ak_shared::CacheConfig;

use crate::InfrastructureError;

/// Redis client with automatic connection management and retries
#[derive(Clone)]
pub struct RedisClient {
    /// Multiplexed connection shared across clones
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of retry attempts for operations
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Create a new Redis client with default retry settings
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, 3, 100).await
    }

    /// Create a new Redis client with custom retry configuration
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(
            "Creating Redis client with URL: {} and max connections: {}",
            mask_url(&config.url),
            config.max_connections
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, max_retries, retry_delay_ms).await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a field inside a hash
    pub async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), InfrastructureError> {
        debug!("HSET '{}' field '{}'", key, field);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let field = field.to_string();
                let value = value.to_string();

                Box::pin(async move { conn.hset::<_, _, _, ()>(key, field, value).await })
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to set hash field '{}'/'{}': {}", key, field, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get a field from a hash, `None` when the field is absent
    pub async fn hash_get(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<String>, InfrastructureError> {
        debug!("HGET '{}' field '{}'", key, field);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let field = field.to_string();

                Box::pin(async move { conn.hget::<_, _, Option<String>>(key, field).await })
            })
            .await;

        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("Failed to get hash field '{}'/'{}': {}", key, field, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a field from a hash, returns whether it existed
    pub async fn hash_delete(&self, key: &str, field: &str) -> Result<bool, InfrastructureError> {
        debug!("HDEL '{}' field '{}'", key, field);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let field = field.to_string();

                Box::pin(async move { conn.hdel::<_, _, u32>(key, field).await })
            })
            .await;

        match result {
            Ok(deleted) => Ok(deleted > 0),
            Err(e) => {
                error!("Failed to delete hash field '{}'/'{}': {}", key, field, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// List all fields of a hash
    pub async fn hash_keys(&self, key: &str) -> Result<Vec<String>, InfrastructureError> {
        debug!("HKEYS '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.hkeys::<_, Vec<String>>(key).await })
            })
            .await;

        match result {
            Ok(fields) => Ok(fields),
            Err(e) => {
                error!("Failed to list hash fields for '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if the Redis connection is healthy via PING
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry on transient errors
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(
            MultiplexedConnection,
        )
            -> std::pin::Pin<Box<dyn std::future::Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Whether an error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL before logging it
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
