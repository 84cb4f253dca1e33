//! Auth State Value Object
//!
//! Finite-state value owned by the state machine. Exactly one state is
//! active at any instant; `Ready` is the only state in which user, role
//! and tenant scope are all guaranteed populated and consistent.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Init,
    CheckingSession,
    Unauthenticated,
    /// Session found, profile not yet requested
    Authenticated,
    LoadingProfile,
    Ready,
    /// Terminal: profile/role fetch failed
    ErrorProfile,
    /// Terminal: session check failed, retries exhausted
    ErrorTimeout,
}

impl AuthState {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use AuthState::*;
        match self {
            Init => "init",
            CheckingSession => "checking_session",
            Unauthenticated => "unauthenticated",
            Authenticated => "authenticated",
            LoadingProfile => "loading_profile",
            Ready => "ready",
            ErrorProfile => "error_profile",
            ErrorTimeout => "error_timeout",
        }
    }

    /// Derived loading flag for the transient states
    #[inline]
    pub const fn is_loading(&self) -> bool {
        use AuthState::*;
        matches!(self, Init | CheckingSession | LoadingProfile)
    }

    /// Terminal error states: only explicit user action transitions out
    #[inline]
    pub const fn is_terminal_error(&self) -> bool {
        use AuthState::*;
        matches!(self, ErrorProfile | ErrorTimeout)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_states() {
        assert!(AuthState::Init.is_loading());
        assert!(AuthState::CheckingSession.is_loading());
        assert!(AuthState::LoadingProfile.is_loading());
        assert!(!AuthState::Authenticated.is_loading());
        assert!(!AuthState::Ready.is_loading());
        assert!(!AuthState::Unauthenticated.is_loading());
        assert!(!AuthState::ErrorTimeout.is_loading());
    }

    #[test]
    fn test_terminal_errors() {
        assert!(AuthState::ErrorProfile.is_terminal_error());
        assert!(AuthState::ErrorTimeout.is_terminal_error());
        assert!(!AuthState::Ready.is_terminal_error());
        assert!(!AuthState::Unauthenticated.is_terminal_error());
    }
}
