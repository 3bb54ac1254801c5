//! Auth token service configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Highest worker id the snowflake id generator can carry (10 bits).
pub const MAX_WORKER_ID: i64 = 1023;

/// Configuration for the auth token service
///
/// Loaded once at startup and treated as immutable afterwards. The
/// `auth_code` is the service-to-service trust credential every caller of
/// `new_auth`/`del_auth` must present; it is not a user credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to sign and verify tokens (HS256)
    pub token_secret: String,

    /// Issuer claim embedded in every token
    pub token_issuer: String,

    /// Refresh token lifetime in seconds
    pub refresh_token_lifetime: i64,

    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,

    /// Worker id for the snowflake id generator (0..=1023)
    pub worker_id: i64,

    /// Shared credential callers must present for issuance and revocation
    pub auth_code: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::from("development-secret-please-change-in-production"),
            token_issuer: String::from("authkit"),
            refresh_token_lifetime: 604800, // 7 days
            access_token_lifetime: 900,     // 15 minutes
            worker_id: 0,
            auth_code: String::from("development-auth-code"),
        }
    }
}

impl AuthConfig {
    /// Create a new configuration with an explicit secret and auth code
    pub fn new(token_secret: impl Into<String>, auth_code: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            auth_code: auth_code.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let token_secret =
            std::env::var("AUTH_TOKEN_SECRET").unwrap_or(defaults.token_secret);
        let token_issuer =
            std::env::var("AUTH_TOKEN_ISSUER").unwrap_or(defaults.token_issuer);
        let refresh_token_lifetime = std::env::var("AUTH_REFRESH_TOKEN_LIFETIME")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.refresh_token_lifetime);
        let access_token_lifetime = std::env::var("AUTH_ACCESS_TOKEN_LIFETIME")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.access_token_lifetime);
        let worker_id = std::env::var("AUTH_WORKER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.worker_id);
        let auth_code = std::env::var("AUTH_CODE").unwrap_or(defaults.auth_code);

        Self {
            token_secret,
            token_issuer,
            refresh_token_lifetime,
            access_token_lifetime,
            worker_id,
            auth_code,
        }
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.token_issuer = issuer.into();
        self
    }

    /// Set refresh token lifetime in seconds
    pub fn with_refresh_lifetime(mut self, seconds: i64) -> Self {
        self.refresh_token_lifetime = seconds;
        self
    }

    /// Set access token lifetime in seconds
    pub fn with_access_lifetime(mut self, seconds: i64) -> Self {
        self.access_token_lifetime = seconds;
        self
    }

    /// Set the id generator worker id
    pub fn with_worker_id(mut self, worker_id: i64) -> Self {
        self.worker_id = worker_id;
        self
    }

    /// Check if using the default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.token_secret == AuthConfig::default().token_secret
    }

    /// Validate the configuration before wiring the service
    ///
    /// Empty credentials and non-positive lifetimes are refused outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "token_secret".to_string(),
            });
        }
        if self.token_issuer.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "token_issuer".to_string(),
            });
        }
        if self.auth_code.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "auth_code".to_string(),
            });
        }
        if self.refresh_token_lifetime <= 0 {
            return Err(ConfigError::OutOfRange {
                field: "refresh_token_lifetime".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.access_token_lifetime <= 0 {
            return Err(ConfigError::OutOfRange {
                field: "access_token_lifetime".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if !(0..=MAX_WORKER_ID).contains(&self.worker_id) {
            return Err(ConfigError::OutOfRange {
                field: "worker_id".to_string(),
                reason: format!("must be in 0..={}", MAX_WORKER_ID),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert_eq!(config.refresh_token_lifetime, 604800);
        assert_eq!(config.access_token_lifetime, 900);
        assert_eq!(config.worker_id, 0);
        assert!(config.is_using_default_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_config_builder() {
        let config = AuthConfig::new("my-secret", "my-auth-code")
            .with_issuer("authkit/test")
            .with_refresh_lifetime(120)
            .with_access_lifetime(30)
            .with_worker_id(3);

        assert_eq!(config.token_issuer, "authkit/test");
        assert_eq!(config.refresh_token_lifetime, 120);
        assert_eq!(config.access_token_lifetime, 30);
        assert_eq!(config.worker_id, 3);
        assert!(!config.is_using_default_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = AuthConfig::default();
        config.token_secret = String::new();

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingValue {
                field: "token_secret".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_worker_id() {
        let config = AuthConfig::default().with_worker_id(MAX_WORKER_ID + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_lifetime() {
        let config = AuthConfig::default().with_access_lifetime(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }
}
