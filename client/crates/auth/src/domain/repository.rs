//! Provider Ports
//!
//! Interfaces to the external collaborators this core consumes.
//! Implementations live in the infrastructure layer.

use tokio::sync::broadcast;

use crate::domain::entity::identity::Identity;
use crate::domain::entity::profile::RoleAssignment;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;
use kernel::id::UserId;

/// Live session as reported by the identity provider
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub identity: Identity,
}

/// Session-change events published by the identity provider
///
/// Only `SignedIn` and `SignedOut` are acted on by the state machine;
/// everything else is deliberately ignored (a token refresh must not
/// re-trigger a full profile reload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    PasswordRecovery,
    UserUpdated,
}

/// Identity provider session API
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Resolve whether a live session exists
    async fn get_session(&self) -> AuthResult<Option<ProviderSession>>;

    /// Password sign-in; a successful return implies a live session
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AuthResult<ProviderSession>;

    /// Registration with an email-confirmation redirect target
    async fn sign_up(&self, email: &Email, password: &str, redirect_to: &str) -> AuthResult<()>;

    /// Global sign-out (all devices)
    async fn sign_out_global(&self) -> AuthResult<()>;

    /// Change the current user's password
    async fn update_password(&self, new_password: &str) -> AuthResult<()>;

    /// Subscribe to the provider's session-change event stream
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Role/profile store port
#[trait_variant::make(RoleStore: Send)]
pub trait LocalRoleStore {
    /// Zero-or-more role rows for a user; empty means "no role assigned"
    async fn assignments_for(&self, user_id: UserId) -> AuthResult<Vec<RoleAssignment>>;
}
