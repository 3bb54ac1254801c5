//! Auth domain error taxonomy
//!
//! Every failure the service can report carries a stable numeric code and a
//! bilingual (English | Chinese) message. All errors are terminal for the
//! operation that raised them; retry policy belongs to the caller.
//! `TokenShouldRefresh` is a control-flow signal rather than a true
//! failure: the refresh flow treats it as "proceed".

use ak_shared::ErrorResponse;
use thiserror::Error;

/// Errors raised by the auth token service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("auth code verify failed | auth code 验证失败")]
    AuthCodeWrong,

    #[error("token empty, please login first | token为空，如未登录，请先登录")]
    TokenEmpty,

    #[error("token verify failed | token校验失败")]
    TokenCheckFailed,

    #[error("token expired, please login again | token已过期，请重新登录")]
    TokenTimeout,

    #[error("token generate failed | token生成失败")]
    TokenGenerateFailed,

    #[error("token save failed | token持久化失败")]
    TokenSaveFailed,

    #[error("token validate type error | token校验类型错误")]
    TokenTypeWrong,

    #[error("the account has logged in on another device, please make sure the account is safe | 您的账户已在其他设备登录，请注意账户安全")]
    OtherDeviceLogin,

    #[error("access token should refresh | access token需要刷新")]
    TokenShouldRefresh,

    #[error("access token should not refresh | access token无需刷新")]
    ShouldNotRefresh,

    #[error("token record not found | token记录不存在")]
    TokenNotFound,

    #[error("token storage failure: {message} | token存储访问失败: {message}")]
    Storage { message: String },
}

impl AuthError {
    /// Stable numeric status code
    pub fn code(&self) -> u16 {
        match self {
            AuthError::TokenEmpty => 801,
            AuthError::TokenCheckFailed => 802,
            AuthError::TokenTimeout => 803,
            AuthError::TokenGenerateFailed => 804,
            AuthError::TokenSaveFailed => 805,
            AuthError::TokenTypeWrong => 806,
            AuthError::OtherDeviceLogin => 807,
            AuthError::TokenShouldRefresh => 808,
            AuthError::ShouldNotRefresh => 809,
            AuthError::TokenNotFound => 810,
            AuthError::AuthCodeWrong => 811,
            AuthError::Storage { .. } => 812,
        }
    }

    /// Symbolic code for programmatic handling
    pub fn symbol(&self) -> &'static str {
        match self {
            AuthError::AuthCodeWrong => "AUTH_CODE_WRONG",
            AuthError::TokenEmpty => "TOKEN_EMPTY",
            AuthError::TokenCheckFailed => "TOKEN_CHECK_FAILED",
            AuthError::TokenTimeout => "TOKEN_TIMEOUT",
            AuthError::TokenGenerateFailed => "TOKEN_GENERATE_FAILED",
            AuthError::TokenSaveFailed => "TOKEN_SAVE_FAILED",
            AuthError::TokenTypeWrong => "TOKEN_TYPE_WRONG",
            AuthError::OtherDeviceLogin => "OTHER_DEVICE_LOGIN",
            AuthError::TokenShouldRefresh => "TOKEN_SHOULD_REFRESH",
            AuthError::ShouldNotRefresh => "SHOULD_NOT_REFRESH",
            AuthError::TokenNotFound => "TOKEN_NOT_FOUND",
            AuthError::Storage { .. } => "TOKEN_STORAGE_FAILURE",
        }
    }

    /// English half of the bilingual message
    pub fn message_en(&self) -> String {
        extract_english_message(&self.to_string()).to_string()
    }

    /// Chinese half of the bilingual message
    pub fn message_zh(&self) -> String {
        extract_chinese_message(&self.to_string()).to_string()
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        ErrorResponse::new(err.code(), err.symbol(), err.to_string())
    }
}

/// Extract the English message from a bilingual error string
pub fn extract_english_message(message: &str) -> &str {
    message.split(" | ").next().unwrap_or(message)
}

/// Extract the Chinese message from a bilingual error string
pub fn extract_chinese_message(message: &str) -> &str {
    message.split(" | ").nth(1).unwrap_or(message)
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AuthError::TokenEmpty.code(), 801);
        assert_eq!(AuthError::TokenCheckFailed.code(), 802);
        assert_eq!(AuthError::TokenTimeout.code(), 803);
        assert_eq!(AuthError::TokenGenerateFailed.code(), 804);
        assert_eq!(AuthError::TokenSaveFailed.code(), 805);
        assert_eq!(AuthError::TokenTypeWrong.code(), 806);
        assert_eq!(AuthError::OtherDeviceLogin.code(), 807);
        assert_eq!(AuthError::TokenShouldRefresh.code(), 808);
        assert_eq!(AuthError::ShouldNotRefresh.code(), 809);
        assert_eq!(AuthError::TokenNotFound.code(), 810);
        assert_eq!(AuthError::AuthCodeWrong.code(), 811);
    }

    #[test]
    fn test_bilingual_messages() {
        let err = AuthError::OtherDeviceLogin;
        let message = err.to_string();
        assert!(message.contains("another device"));
        assert!(message.contains("其他设备"));
        assert_eq!(err.message_en(), extract_english_message(&message));
        assert_eq!(err.message_zh(), extract_chinese_message(&message));
    }

    #[test]
    fn test_error_response_conversion() {
        let response: ErrorResponse = AuthError::AuthCodeWrong.into();
        assert_eq!(response.code, 811);
        assert_eq!(response.error, "AUTH_CODE_WRONG");
        assert!(response.message.contains("auth code verify failed"));
    }

    #[test]
    fn test_storage_error_carries_message() {
        let err = AuthError::Storage {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.code(), 812);
        assert!(err.message_en().contains("connection refused"));
    }

    #[test]
    fn test_message_extraction_without_separator() {
        assert_eq!(extract_english_message("plain"), "plain");
        assert_eq!(extract_chinese_message("plain"), "plain");
    }
}
