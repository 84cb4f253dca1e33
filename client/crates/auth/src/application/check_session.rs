//! Check Session Use Case
//!
//! The session resolver: two independent network calls, each raced
//! against its own timeout, each guarded by the caller's generation
//! token. A superseded token turns any late result into `Superseded`,
//! which the state machine discards without committing.

use std::sync::Arc;

use platform::cancel::CheckToken;
use tokio::time::timeout;

use crate::application::config::AuthConfig;
use crate::domain::entity::profile::UserProfile;
use crate::domain::repository::{IdentityProvider, ProviderSession, RoleStore};
use crate::domain::value_object::diagnostics::{Diagnostics, ProfileFetchStatus};
use crate::error::AuthError;
use kernel::id::UserId;

/// Outcome of the session-existence leg
#[derive(Debug)]
pub enum SessionPhase {
    /// No live session; the profile leg must not run
    NoSession,
    Found(ProviderSession),
    Failed { timed_out: bool },
    Superseded,
}

/// Outcome of the profile/role leg
#[derive(Debug)]
pub enum ProfilePhase {
    Resolved(UserProfile),
    Failed { timed_out: bool },
    Superseded,
}

/// Session resolver
pub struct SessionResolver<P, R>
where
    P: IdentityProvider + Send + Sync + 'static,
    R: RoleStore + Send + Sync + 'static,
{
    provider: Arc<P>,
    roles: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<P, R> SessionResolver<P, R>
where
    P: IdentityProvider + Send + Sync + 'static,
    R: RoleStore + Send + Sync + 'static,
{
    pub fn new(provider: Arc<P>, roles: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            provider,
            roles,
            config,
        }
    }

    /// Resolve whether a live session exists, within the timeout budget
    pub async fn check_session(
        &self,
        token: &CheckToken,
        diagnostics: &mut Diagnostics,
    ) -> SessionPhase {
        let result = timeout(self.config.session_check_timeout, self.provider.get_session()).await;

        // The token is the authority on staleness, checked before any
        // result is allowed to matter
        if token.is_superseded() {
            return SessionPhase::Superseded;
        }

        match result {
            Err(_elapsed) => {
                diagnostics.timeout_hit = true;
                diagnostics.error_type = Some(AuthError::SessionCheckTimeout.code().to_string());
                SessionPhase::Failed { timed_out: true }
            }
            Ok(Err(e)) => {
                e.log();
                diagnostics.error_type = Some(e.code().to_string());
                SessionPhase::Failed { timed_out: false }
            }
            Ok(Ok(None)) => {
                diagnostics.session_found = false;
                diagnostics.profile_fetch = ProfileFetchStatus::Skipped;
                SessionPhase::NoSession
            }
            Ok(Ok(Some(session))) => {
                diagnostics.session_found = true;
                SessionPhase::Found(session)
            }
        }
    }

    /// Resolve the caller's role rows, within the timeout budget
    pub async fn fetch_profile(
        &self,
        token: &CheckToken,
        user_id: UserId,
        diagnostics: &mut Diagnostics,
    ) -> ProfilePhase {
        let result = timeout(
            self.config.profile_fetch_timeout,
            self.roles.assignments_for(user_id),
        )
        .await;

        if token.is_superseded() {
            return ProfilePhase::Superseded;
        }

        match result {
            Err(_elapsed) => {
                diagnostics.timeout_hit = true;
                diagnostics.profile_fetch = ProfileFetchStatus::Failed;
                diagnostics.error_type = Some(AuthError::ProfileFetchTimeout.code().to_string());
                ProfilePhase::Failed { timed_out: true }
            }
            Ok(Err(e)) => {
                e.log();
                diagnostics.profile_fetch = ProfileFetchStatus::Failed;
                diagnostics.error_type = Some(e.code().to_string());
                ProfilePhase::Failed { timed_out: false }
            }
            Ok(Ok(assignments)) => {
                diagnostics.profile_fetch = ProfileFetchStatus::Ok;
                ProfilePhase::Resolved(UserProfile::from_assignments(assignments))
            }
        }
    }
}
