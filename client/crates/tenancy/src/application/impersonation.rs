//! Impersonation Manager
//!
//! Two states: idle and impersonating. The active session is persisted in
//! the ephemeral session store under a fixed key so it survives a reload
//! but never outlives the browser session. Audit entries are written
//! best-effort: a failed audit write is surfaced to logs but never blocks
//! the privileged action.

use std::sync::{Arc, Mutex};

use platform::audit::{AuditEntry, AuditLogger, AuditSink, actions};
use platform::storage::SessionStore;

use auth::models::AuthSnapshot;

use crate::application::config::TenancyConfig;
use crate::domain::entities::{ImpersonationSession, Tenant};
use crate::error::{TenancyError, TenancyResult};

pub struct ImpersonationManager<S, A>
where
    S: SessionStore,
    A: AuditSink + Send + Sync + 'static,
{
    storage: Arc<S>,
    audit: AuditLogger<A>,
    config: TenancyConfig,
    state: Mutex<Option<ImpersonationSession>>,
}

impl<S, A> ImpersonationManager<S, A>
where
    S: SessionStore,
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(storage: Arc<S>, audit: AuditLogger<A>, config: TenancyConfig) -> Self {
        Self {
            storage,
            audit,
            config,
            state: Mutex::new(None),
        }
    }

    /// Begin impersonating a tenant
    ///
    /// Refused with a warning unless the caller is an authenticated super
    /// admin; suspended tenants are refused. The `impersonation_start`
    /// audit entry is written before the new state is committed, but an
    /// audit failure does not stop the impersonation.
    pub async fn start(
        &self,
        snapshot: &AuthSnapshot,
        tenant: &Tenant,
        return_url: Option<String>,
    ) -> TenancyResult<ImpersonationSession> {
        let actor = match &snapshot.user {
            Some(user) if snapshot.is_authenticated() && snapshot.role.is_super_admin() => {
                user.user_id
            }
            _ => {
                tracing::warn!(
                    role = %snapshot.role,
                    "Impersonation refused: caller is not an authenticated super admin"
                );
                return Err(TenancyError::NotSuperAdmin);
            }
        };
        if tenant.is_suspended {
            tracing::warn!(tenant_id = %tenant.tenant_id, "Impersonation refused: tenant suspended");
            return Err(TenancyError::TenantSuspended(tenant.tenant_id));
        }

        let session = ImpersonationSession::start_now(actor, tenant.to_ref(), return_url);

        // Audit before commit; errors are swallowed inside the logger
        self.audit
            .log_settled(
                AuditEntry::new(actions::IMPERSONATION_START)
                    .actor(actor.into_uuid())
                    .tenant(tenant.tenant_id.into_uuid())
                    .metadata(serde_json::json!({ "tenant_name": tenant.name })),
            )
            .await;

        let json = serde_json::to_string(&session)
            .map_err(|e| TenancyError::Directory(e.to_string()))?;
        self.storage
            .put(&self.config.impersonation_storage_key, &json)?;
        *self.state.lock().expect("impersonation lock poisoned") = Some(session.clone());

        tracing::info!(
            actor = %actor,
            tenant_id = %tenant.tenant_id,
            tenant = %tenant.name,
            "Impersonation started"
        );
        Ok(session)
    }

    /// End the active impersonation
    ///
    /// Returns the stored return URL so the caller can navigate back; the
    /// manager itself never navigates. A no-op returning `None` when idle.
    pub async fn stop(&self) -> TenancyResult<Option<String>> {
        let Some(session) = self.current()? else {
            return Ok(None);
        };

        self.audit
            .log_settled(
                AuditEntry::new(actions::IMPERSONATION_END)
                    .actor(session.actor_user_id.into_uuid())
                    .tenant(session.tenant.tenant_id.into_uuid()),
            )
            .await;

        self.storage.remove(&self.config.impersonation_storage_key)?;
        *self.state.lock().expect("impersonation lock poisoned") = None;

        tracing::info!(tenant_id = %session.tenant.tenant_id, "Impersonation ended");
        Ok(session.return_url)
    }

    /// Sign-out lifecycle hook: drop any active impersonation without an
    /// audit entry of its own (the sign-out is the audited event)
    pub fn clear_on_sign_out(&self) {
        if let Err(e) = self.storage.remove(&self.config.impersonation_storage_key) {
            tracing::warn!(error = %e, "Failed to clear impersonation storage on sign-out");
        }
        *self.state.lock().expect("impersonation lock poisoned") = None;
    }

    /// The active impersonation, reloaded lazily from storage
    ///
    /// Lazy reload is what lets the session survive a page reload within
    /// the same browser session. A corrupt stored value is discarded.
    pub fn current(&self) -> TenancyResult<Option<ImpersonationSession>> {
        let mut state = self.state.lock().expect("impersonation lock poisoned");
        if state.is_some() {
            return Ok(state.clone());
        }

        let Some(json) = self.storage.get(&self.config.impersonation_storage_key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<ImpersonationSession>(&json) {
            Ok(session) => {
                *state = Some(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt impersonation session");
                let _ = self.storage.remove(&self.config.impersonation_storage_key);
                Ok(None)
            }
        }
    }

    /// Whether an impersonation is active
    pub fn is_impersonating(&self) -> bool {
        matches!(self.current(), Ok(Some(_)))
    }
}
