//! REST Adapters
//!
//! Adapters for the hosted backend-as-a-service: a GoTrue-style identity
//! API under `/auth/v1` and PostgREST tables under `/rest/v1`. The hosted
//! API cannot push events to a native client, so the provider still owns
//! a broadcast channel the host application feeds.

use std::sync::Mutex;

use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::entity::identity::Identity;
use crate::domain::entity::profile::RoleAssignment;
use crate::domain::repository::{
    IdentityProvider, ProviderSession, RoleStore,
    SessionEvent,
};
use crate::domain::value_object::email::Email;
use crate::domain::value_object::role::Role;
use crate::error::{AuthError, AuthResult};
use kernel::id::{Id, UserId};
use platform::audit::{AuditEntry, AuditSink};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Hosted backend endpoint configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project base URL, no trailing slash
    pub base_url: String,
    /// Public (anon) API key
    pub anon_key: String,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: Uuid,
    email: String,
}

#[derive(Debug, Deserialize)]
struct TokenDto {
    access_token: String,
    user: UserDto,
}

#[derive(Debug, Deserialize)]
struct RoleRowDto {
    role: String,
    tenant_id: Option<Uuid>,
}

fn provider_err(e: reqwest::Error) -> AuthError {
    AuthError::Provider(e.to_string())
}

/// GoTrue-style identity provider adapter
pub struct RestIdentityProvider {
    http: reqwest::Client,
    config: RestConfig,
    access_token: Mutex<Option<String>>,
    events: broadcast::Sender<SessionEvent>,
}

impl RestIdentityProvider {
    pub fn new(config: RestConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            http: reqwest::Client::new(),
            config,
            access_token: Mutex::new(None),
            events,
        }
    }

    fn token(&self) -> Option<String> {
        self.access_token.lock().expect("token lock poisoned").clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self.access_token.lock().expect("token lock poisoned") = token;
    }

    /// Feed an event from the host (deep link, another tab, ...)
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.config.base_url, path)
    }

    fn identity_from(user: UserDto) -> Identity {
        Identity::new(Id::from_uuid(user.id), Email::from_provider(user.email))
    }
}

impl IdentityProvider for RestIdentityProvider {
    async fn get_session(&self) -> AuthResult<Option<ProviderSession>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.auth_url("/user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(provider_err)?;

        match response.status() {
            status if status.is_success() => {
                let user: UserDto = response.json().await.map_err(provider_err)?;
                Ok(Some(ProviderSession {
                    identity: Self::identity_from(user),
                }))
            }
            reqwest::StatusCode::UNAUTHORIZED => {
                // Token expired server-side; the local session is gone
                self.set_token(None);
                Ok(None)
            }
            status => Err(AuthError::SessionCheckFailed(format!(
                "Session endpoint returned {status}"
            ))),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AuthResult<ProviderSession> {
        let response = self
            .http
            .post(self.auth_url("/token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await
            .map_err(provider_err)?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST
            || response.status() == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AuthError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenDto = response.json().await.map_err(provider_err)?;
        self.set_token(Some(token.access_token));
        let _ = self.events.send(SessionEvent::SignedIn);

        Ok(ProviderSession {
            identity: Self::identity_from(token.user),
        })
    }

    async fn sign_up(&self, email: &Email, password: &str, redirect_to: &str) -> AuthResult<()> {
        let response = self
            .http
            .post(self.auth_url("/signup"))
            // reqwest percent-encodes the redirect URL for us
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await
            .map_err(provider_err)?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::SignUpFailed(body));
        }
        Ok(())
    }

    async fn sign_out_global(&self) -> AuthResult<()> {
        let token = self.token();
        // Local session is dropped regardless of the remote outcome
        self.set_token(None);
        let _ = self.events.send(SessionEvent::SignedOut);

        let Some(token) = token else {
            return Ok(());
        };

        self.http
            .post(self.auth_url("/logout?scope=global"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(provider_err)?;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> AuthResult<()> {
        let token = self
            .token()
            .ok_or_else(|| AuthError::Provider("No live session".into()))?;

        let response = self
            .http
            .put(self.auth_url("/user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(provider_err)?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "Password update returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// PostgREST role store adapter
pub struct RestRoleStore {
    http: reqwest::Client,
    config: RestConfig,
}

impl RestRoleStore {
    pub fn new(config: RestConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl RoleStore for RestRoleStore {
    async fn assignments_for(&self, user_id: UserId) -> AuthResult<Vec<RoleAssignment>> {
        let url = format!(
            "{}/rest/v1/user_roles?select=role,tenant_id&user_id=eq.{}",
            self.config.base_url, user_id
        );
        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::ProfileFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::ProfileFetchFailed(format!(
                "Role store returned {}",
                response.status()
            )));
        }

        let rows: Vec<RoleRowDto> = response
            .json()
            .await
            .map_err(|e| AuthError::ProfileFetchFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| RoleAssignment {
                role: Role::from_code(&row.role),
                tenant_id: row.tenant_id.map(Id::from_uuid),
            })
            .collect())
    }
}

/// PostgREST audit sink adapter
pub struct RestAuditSink {
    http: reqwest::Client,
    config: RestConfig,
}

impl RestAuditSink {
    pub fn new(config: RestConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl AuditSink for RestAuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), String> {
        let url = format!("{}/rest/v1/audit_logs", self.config.base_url);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.anon_key)
            .json(&entry)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("Audit sink returned {}", response.status()));
        }
        Ok(())
    }
}
