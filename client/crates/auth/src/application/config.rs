//! Application Configuration
//!
//! Configuration for the auth application layer. The reference constants
//! (4000ms checks, one automatic retry, 300ms redirect deadline) live here
//! as configuration, not hard-coded law.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Budget for the session-existence call
    pub session_check_timeout: Duration,
    /// Budget for the profile/role call
    pub profile_fetch_timeout: Duration,
    /// Automatic retries of a failed *session* check before `ErrorTimeout`
    pub max_auto_retries: u32,
    /// Bound on how long an unauthenticated guard may sit before its
    /// redirect decision is surfaced
    pub redirect_deadline: Duration,
    /// Email-confirmation redirect target passed to the provider on sign-up
    pub signup_redirect_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_check_timeout: Duration::from_millis(4000),
            profile_fetch_timeout: Duration::from_millis(4000),
            max_auto_retries: 1,
            redirect_deadline: Duration::from_millis(300),
            signup_redirect_url: "/auth/confirm".to_string(),
        }
    }
}

impl AuthConfig {
    /// Config with tight budgets for tests
    pub fn fast() -> Self {
        Self {
            session_check_timeout: Duration::from_millis(50),
            profile_fetch_timeout: Duration::from_millis(50),
            ..Default::default()
        }
    }
}
