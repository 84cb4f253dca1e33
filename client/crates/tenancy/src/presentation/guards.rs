//! Admin Scope Guard
//!
//! Admin-console routes layer one extra rule on top of the base route
//! guard: a super admin may never operate under the console without an
//! active impersonation. They are sent to the impersonation picker
//! instead, so every privileged action happens against an explicit,
//! audited tenant.

use auth::guards::{GuardOutcome, RedirectTarget, RouteGuard};
use auth::models::AuthSnapshot;

#[derive(Debug, Clone)]
pub struct AdminScopeGuard {
    base: RouteGuard,
}

impl AdminScopeGuard {
    pub fn new() -> Self {
        Self {
            base: RouteGuard::new().admin_only(),
        }
    }

    /// Wrap an already-configured base guard (capability requirements etc.)
    pub fn over(base: RouteGuard) -> Self {
        Self { base }
    }

    /// Pure decision: base guard first, then the impersonation rule
    pub fn evaluate(&self, snapshot: &AuthSnapshot, impersonating: bool) -> GuardOutcome {
        match self.base.evaluate(snapshot, None) {
            GuardOutcome::Render if snapshot.role.is_super_admin() && !impersonating => {
                GuardOutcome::Redirect {
                    target: RedirectTarget::ImpersonationPicker,
                    deadline: auth::guards::DEFAULT_REDIRECT_DEADLINE,
                }
            }
            other => other,
        }
    }
}

impl Default for AdminScopeGuard {
    fn default() -> Self {
        Self::new()
    }
}
