//! Route Guards
//!
//! Composable gates that read the state machine's snapshot and produce a
//! pure rendering decision: loading, error, forbidden, redirect, or
//! render-children. No business logic lives here; the guard only orders
//! and surfaces decisions the domain has already made.

use std::time::Duration;

use crate::domain::entity::snapshot::AuthSnapshot;
use crate::domain::value_object::auth_state::AuthState;
use crate::domain::value_object::diagnostics::Diagnostics;
use crate::domain::value_object::permissions::Capability;

/// Default bound on how long a redirect decision may sit before the host
/// must navigate (so users are never staring at a blank screen while the
/// full session timeout is still running)
pub const DEFAULT_REDIRECT_DEADLINE: Duration = Duration::from_millis(300);

/// Recovery actions offered on a terminal error screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Retry,
    GoToLogin,
    HardRefresh,
}

/// Where a redirect decision points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    /// Super admin inside the admin console without an impersonation
    ImpersonationPicker,
    Path(String),
}

/// Secondary profile gate (e.g. "must change password")
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraCheck {
    /// Still being resolved; render loading
    Pending,
    Satisfied,
    /// Resolved against the user; navigate them to the given path
    Redirect(String),
}

/// Pure rendering decision
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Loading {
        label: &'static str,
    },
    Error {
        diagnostics: Option<Diagnostics>,
        actions: [RecoveryAction; 3],
    },
    Redirect {
        target: RedirectTarget,
        deadline: Duration,
    },
    Forbidden,
    Render,
}

/// Route guard configuration
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: Option<Capability>,
    admin_only: bool,
    redirect_deadline: Duration,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            required: None,
            admin_only: false,
            redirect_deadline: DEFAULT_REDIRECT_DEADLINE,
        }
    }

    /// Require a specific capability once ready
    pub fn require(mut self, capability: Capability) -> Self {
        self.required = Some(capability);
        self
    }

    /// Require tenant-admin standing or higher
    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    pub fn with_redirect_deadline(mut self, deadline: Duration) -> Self {
        self.redirect_deadline = deadline;
        self
    }

    /// Decide what to render for the given snapshot
    ///
    /// Ordering is fixed: terminal errors, then transient loading (which
    /// includes a pending secondary check), then the unauthenticated
    /// redirect, then permission gates, then children.
    pub fn evaluate(&self, snapshot: &AuthSnapshot, extra: Option<&ExtraCheck>) -> GuardOutcome {
        if snapshot.state.is_terminal_error() {
            return GuardOutcome::Error {
                diagnostics: snapshot.diagnostics.clone(),
                actions: [
                    RecoveryAction::Retry,
                    RecoveryAction::GoToLogin,
                    RecoveryAction::HardRefresh,
                ],
            };
        }

        // `Authenticated` sits between session-found and profile-load
        // commits; it renders as loading, never as a redirect flicker
        if snapshot.is_loading() || snapshot.state == AuthState::Authenticated {
            return GuardOutcome::Loading {
                label: snapshot.state.code(),
            };
        }
        if matches!(extra, Some(ExtraCheck::Pending)) {
            return GuardOutcome::Loading {
                label: "profile_check",
            };
        }

        if !snapshot.is_authenticated() {
            return GuardOutcome::Redirect {
                target: RedirectTarget::Login,
                deadline: self.redirect_deadline,
            };
        }

        if let Some(ExtraCheck::Redirect(path)) = extra {
            return GuardOutcome::Redirect {
                target: RedirectTarget::Path(path.clone()),
                deadline: self.redirect_deadline,
            };
        }

        if self.admin_only && !snapshot.role.is_admin_tier() {
            return GuardOutcome::Forbidden;
        }

        if let Some(capability) = self.required {
            if !snapshot.permissions().has(capability) {
                return GuardOutcome::Forbidden;
            }
        }

        GuardOutcome::Render
    }
}
