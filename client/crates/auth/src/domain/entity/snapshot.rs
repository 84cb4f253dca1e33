//! Auth Snapshot Entity
//!
//! The single observable value of the state machine. Guards and hooks read
//! snapshots; they never reach into machine internals.

use kernel::id::TenantId;

use crate::domain::entity::identity::Identity;
use crate::domain::entity::profile::UserProfile;
use crate::domain::value_object::auth_state::AuthState;
use crate::domain::value_object::diagnostics::Diagnostics;
use crate::domain::value_object::permissions::Permissions;
use crate::domain::value_object::role::Role;

#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub state: AuthState,
    pub user: Option<Identity>,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub tenant_ids: Vec<TenantId>,
    /// Last attempt's diagnostics; populated on terminal error states
    pub diagnostics: Option<Diagnostics>,
}

impl AuthSnapshot {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn checking_session(previous: &AuthSnapshot) -> Self {
        Self {
            state: AuthState::CheckingSession,
            // Keep the previous identity visible while re-checking so the
            // UI does not flicker to a signed-out header
            user: previous.user.clone(),
            role: previous.role,
            tenant_id: previous.tenant_id,
            tenant_ids: previous.tenant_ids.clone(),
            diagnostics: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            state: AuthState::Unauthenticated,
            ..Self::default()
        }
    }

    pub fn session_found(user: Identity) -> Self {
        Self {
            state: AuthState::Authenticated,
            user: Some(user),
            ..Self::default()
        }
    }

    pub fn loading_profile(user: Identity) -> Self {
        Self {
            state: AuthState::LoadingProfile,
            user: Some(user),
            ..Self::default()
        }
    }

    pub fn ready(user: Identity, profile: UserProfile, diagnostics: Diagnostics) -> Self {
        Self {
            state: AuthState::Ready,
            user: Some(user),
            role: profile.role,
            tenant_id: profile.tenant_id,
            tenant_ids: profile.tenant_ids,
            diagnostics: Some(diagnostics),
        }
    }

    pub fn error_timeout(diagnostics: Diagnostics) -> Self {
        Self {
            state: AuthState::ErrorTimeout,
            diagnostics: Some(diagnostics),
            ..Self::default()
        }
    }

    pub fn error_profile(user: Identity, diagnostics: Diagnostics) -> Self {
        Self {
            state: AuthState::ErrorProfile,
            user: Some(user),
            diagnostics: Some(diagnostics),
            ..Self::default()
        }
    }

    /// Derived loading flag
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Authenticated for access-control purposes
    ///
    /// True only when a provider session exists AND the role is a
    /// recognized non-none value. A signed-in user without a role is
    /// reported unauthenticated here.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.role.is_recognized()
    }

    /// Resolved capability set for the current role
    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::email::Email;
    use kernel::id::Id;

    fn identity() -> Identity {
        Identity::new(Id::new(), Email::from_provider("staff@example.com"))
    }

    #[test]
    fn test_initial_snapshot() {
        let snapshot = AuthSnapshot::initial();
        assert_eq!(snapshot.state, AuthState::Init);
        assert!(snapshot.is_loading());
        assert!(!snapshot.is_authenticated());
    }

    #[test]
    fn test_ready_with_role_is_authenticated() {
        let profile = UserProfile {
            role: Role::Staff,
            tenant_id: Some(Id::new()),
            tenant_ids: vec![Id::new()],
        };
        let snapshot =
            AuthSnapshot::ready(identity(), profile, Diagnostics::new_attempt());
        assert_eq!(snapshot.state, AuthState::Ready);
        assert!(snapshot.is_authenticated());
    }

    #[test]
    fn test_ready_without_role_is_not_authenticated() {
        let snapshot = AuthSnapshot::ready(
            identity(),
            UserProfile::default(),
            Diagnostics::new_attempt(),
        );
        assert_eq!(snapshot.state, AuthState::Ready);
        assert!(!snapshot.is_authenticated());
        assert_eq!(snapshot.permissions(), Permissions::NONE);
    }

    #[test]
    fn test_checking_session_keeps_previous_identity() {
        let profile = UserProfile {
            role: Role::TenantAdmin,
            tenant_id: Some(Id::new()),
            tenant_ids: vec![],
        };
        let ready = AuthSnapshot::ready(identity(), profile, Diagnostics::new_attempt());
        let checking = AuthSnapshot::checking_session(&ready);

        assert_eq!(checking.state, AuthState::CheckingSession);
        assert!(checking.user.is_some());
        assert_eq!(checking.role, Role::TenantAdmin);
    }
}
