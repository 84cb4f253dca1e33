//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Session and profile failures are *recovered* into terminal auth states
//! by the state machine; they are never propagated to subscribers as
//! errors. The variants here surface through `sign_in`/`sign_up` results
//! and through diagnostics attached to error screens.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Session check exceeded its timeout budget
    #[error("Session check timed out")]
    SessionCheckTimeout,

    /// Session check failed before the timeout
    #[error("Session check failed: {0}")]
    SessionCheckFailed(String),

    /// Profile/role fetch exceeded its timeout budget
    #[error("Profile fetch timed out")]
    ProfileFetchTimeout,

    /// Profile/role fetch failed before the timeout
    #[error("Profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    /// Automatic retry bound exhausted
    #[error("Maximum session check retries exceeded")]
    MaxRetriesExceeded,

    /// Wrong email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Provider rejected the sign-up request
    #[error("Sign up failed: {0}")]
    SignUpFailed(String),

    /// Input validation error (email format etc.)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Identity provider error outside the taxonomy above
    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::SessionCheckTimeout | AuthError::ProfileFetchTimeout => {
                ErrorKind::RequestTimeout
            }
            AuthError::SessionCheckFailed(_)
            | AuthError::ProfileFetchFailed(_)
            | AuthError::Provider(_) => ErrorKind::ServiceUnavailable,
            AuthError::MaxRetriesExceeded => ErrorKind::TooManyRequests,
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::SignUpFailed(_) => ErrorKind::UnprocessableEntity,
            AuthError::Validation(_) => ErrorKind::BadRequest,
        }
    }

    /// Stable short code for diagnostics (`error_type` field)
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::SessionCheckTimeout => "session_check_timeout",
            AuthError::SessionCheckFailed(_) => "session_check_failed",
            AuthError::ProfileFetchTimeout => "profile_fetch_timeout",
            AuthError::ProfileFetchFailed(_) => "profile_fetch_failed",
            AuthError::MaxRetriesExceeded => "max_retries_exceeded",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::SignUpFailed(_) => "sign_up_failed",
            AuthError::Validation(_) => "validation",
            AuthError::Provider(_) => "provider",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::SessionCheckTimeout | AuthError::ProfileFetchTimeout => {
                tracing::warn!(error = %self, "Auth check timed out");
            }
            AuthError::MaxRetriesExceeded => {
                tracing::error!("Session check retry bound exhausted");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionCheckFailed(_)
            | AuthError::ProfileFetchFailed(_)
            | AuthError::Provider(_) => {
                tracing::warn!(error = %self, "Identity provider failure");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AuthError::SessionCheckTimeout.kind(),
            ErrorKind::RequestTimeout
        );
        assert_eq!(
            AuthError::MaxRetriesExceeded.kind(),
            ErrorKind::TooManyRequests
        );
        assert_eq!(AuthError::InvalidCredentials.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AuthError::SessionCheckTimeout.code(), "session_check_timeout");
        assert_eq!(
            AuthError::ProfileFetchFailed("x".into()).code(),
            "profile_fetch_failed"
        );
    }
}
