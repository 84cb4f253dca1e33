//! Tenant Scope Resolver
//!
//! Derives the effective tenant scope from the auth snapshot and the
//! impersonation state, and validates mutation targets against it.
//! Validation is synchronous and fail-closed: a mis-scoped write is
//! rejected before any network call. Server-side row policies remain the
//! authoritative boundary; this check exists to fail fast and to make
//! impersonation accidents visible during development.

use platform::audit::{AuditEntry, AuditLogger, AuditSink, actions};

use auth::models::AuthSnapshot;
use kernel::id::TenantId;

use crate::domain::entities::ImpersonationSession;
use crate::domain::scope::TenantScope;
use crate::error::{TenancyError, TenancyResult};

pub struct ScopeResolver<A>
where
    A: AuditSink + Send + Sync + 'static,
{
    audit: AuditLogger<A>,
}

impl<A> ScopeResolver<A>
where
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(audit: AuditLogger<A>) -> Self {
        Self { audit }
    }

    /// Derive the scope governing the current session
    pub fn resolve(
        &self,
        snapshot: &AuthSnapshot,
        impersonation: Option<&ImpersonationSession>,
    ) -> TenantScope {
        if !snapshot.is_authenticated() {
            return TenantScope::none();
        }
        if snapshot.role.is_super_admin() {
            return match impersonation {
                Some(session) => TenantScope::impersonating(session.tenant.tenant_id),
                None => TenantScope::super_admin(snapshot.tenant_id, snapshot.tenant_ids.clone()),
            };
        }
        TenantScope::member(snapshot.tenant_id, snapshot.tenant_ids.clone())
    }

    /// Validate a mutation's target tenant against the effective scope
    ///
    /// - absent target: nothing to validate, returns Ok
    /// - impersonating: target must equal the impersonated tenant
    /// - non-super-admin: target must equal the effective tenant
    /// - super admin without impersonation: unrestricted (global scope)
    ///
    /// Every mutation path calls this before issuing its write.
    pub fn validate_tenant_mutation(
        &self,
        scope: &TenantScope,
        target: Option<&TenantId>,
    ) -> TenancyResult<()> {
        let Some(&target) = target else {
            return Ok(());
        };

        let restricted = scope.is_impersonating || !scope.is_super_admin;
        if restricted && Some(target) != scope.effective_tenant_id() {
            let effective = scope.effective_tenant_id();
            tracing::error!(
                %target,
                ?effective,
                impersonating = scope.is_impersonating,
                "Cross-tenant mutation rejected"
            );
            self.audit.log(
                AuditEntry::new(actions::CROSS_TENANT_MUTATION_REJECTED)
                    .tenant(target.into_uuid())
                    .metadata(serde_json::json!({
                        "effective_tenant_id": effective.map(|id| id.to_string()),
                        "is_impersonating": scope.is_impersonating,
                    })),
            );
            return Err(TenancyError::CrossTenantMutationRejected { target, effective });
        }
        Ok(())
    }
}
