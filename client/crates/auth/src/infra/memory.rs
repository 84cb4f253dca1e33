//! In-Memory Adapters
//!
//! In-process implementations of the identity provider and role store,
//! used by the console app and the test suites.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::domain::entity::identity::Identity;
use crate::domain::entity::profile::RoleAssignment;
use crate::domain::repository::{IdentityProvider, ProviderSession, RoleStore, SessionEvent};
use crate::domain::value_object::email::Email;
use crate::domain::value_object::role::Role;
use crate::error::{AuthError, AuthResult};
use kernel::id::{TenantId, UserId};

const EVENT_CHANNEL_CAPACITY: usize = 16;

struct SeededUser {
    user_id: UserId,
    password: String,
}

/// In-memory identity provider
///
/// Seeded with users up front; emits `SignedIn`/`SignedOut` on its own
/// event stream the way the hosted provider does.
pub struct MemoryIdentityProvider {
    users: Mutex<HashMap<String, SeededUser>>,
    current: Mutex<Option<ProviderSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            users: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            events,
        }
    }

    /// Register a user with known credentials
    pub fn seed_user(&self, email: &str, password: &str, user_id: UserId) {
        self.users.lock().expect("provider lock poisoned").insert(
            email.to_lowercase(),
            SeededUser {
                user_id,
                password: password.to_string(),
            },
        );
    }

    /// Start with a live session already in place
    pub fn set_session(&self, identity: Identity) {
        *self.current.lock().expect("provider lock poisoned") =
            Some(ProviderSession { identity });
    }

    /// Emit an arbitrary session event (tests drive the listener this way)
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn get_session(&self) -> AuthResult<Option<ProviderSession>> {
        Ok(self.current.lock().expect("provider lock poisoned").clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AuthResult<ProviderSession> {
        let session = {
            let users = self.users.lock().expect("provider lock poisoned");
            let user = users
                .get(email.as_str())
                .ok_or(AuthError::InvalidCredentials)?;
            if user.password != password {
                return Err(AuthError::InvalidCredentials);
            }
            ProviderSession {
                identity: Identity::new(user.user_id, email.clone()),
            }
        };

        *self.current.lock().expect("provider lock poisoned") = Some(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn);
        Ok(session)
    }

    async fn sign_up(&self, email: &Email, password: &str, _redirect_to: &str) -> AuthResult<()> {
        let mut users = self.users.lock().expect("provider lock poisoned");
        if users.contains_key(email.as_str()) {
            return Err(AuthError::SignUpFailed("Email already registered".into()));
        }
        users.insert(
            email.as_str().to_string(),
            SeededUser {
                user_id: UserId::new(),
                password: password.to_string(),
            },
        );
        Ok(())
    }

    async fn sign_out_global(&self) -> AuthResult<()> {
        *self.current.lock().expect("provider lock poisoned") = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> AuthResult<()> {
        let current = self.current.lock().expect("provider lock poisoned").clone();
        let session = current.ok_or_else(|| AuthError::Provider("No live session".into()))?;

        let mut users = self.users.lock().expect("provider lock poisoned");
        let user = users
            .get_mut(session.identity.email.as_str())
            .ok_or_else(|| AuthError::Provider("Unknown user".into()))?;
        user.password = new_password.to_string();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// In-memory role store
#[derive(Default)]
pub struct MemoryRoleStore {
    assignments: Mutex<HashMap<UserId, Vec<RoleAssignment>>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&self, user_id: UserId, role: Role, tenant_id: Option<TenantId>) {
        self.assignments
            .lock()
            .expect("role store lock poisoned")
            .entry(user_id)
            .or_default()
            .push(RoleAssignment { role, tenant_id });
    }
}

impl RoleStore for MemoryRoleStore {
    async fn assignments_for(&self, user_id: UserId) -> AuthResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .expect("role store lock poisoned")
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_session() {
        let provider = MemoryIdentityProvider::new();
        let user_id = UserId::new();
        provider.seed_user("staff@example.com", "hunter2", user_id);

        assert!(provider.get_session().await.unwrap().is_none());

        let email = Email::new("staff@example.com").unwrap();
        let session = provider
            .sign_in_with_password(&email, "hunter2")
            .await
            .unwrap();
        assert_eq!(session.identity.user_id, user_id);
        assert!(provider.get_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_user("staff@example.com", "hunter2", UserId::new());

        let email = Email::new("staff@example.com").unwrap();
        let result = provider.sign_in_with_password(&email, "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_out_emits_event() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_user("staff@example.com", "hunter2", UserId::new());
        let mut events = provider.subscribe();

        let email = Email::new("staff@example.com").unwrap();
        provider
            .sign_in_with_password(&email, "hunter2")
            .await
            .unwrap();
        provider.sign_out_global().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedIn);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
        assert!(provider.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_store_empty_is_valid() {
        let store = MemoryRoleStore::new();
        let rows = store.assignments_for(UserId::new()).await.unwrap();
        assert!(rows.is_empty());
    }
}
