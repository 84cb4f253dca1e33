//! Tenant Scope
//!
//! The derived scope value governing data access for the current session.
//! Constructors enforce the invariants so no other code path can build an
//! inconsistent scope:
//! - a non-super-admin always requires tenant scope and its tenant id is a
//!   member of its tenant list
//! - an impersonating scope's tenant id is the impersonated tenant's,
//!   regardless of the actor's own (typically absent) tenant

use kernel::id::TenantId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    pub tenant_id: Option<TenantId>,
    pub tenant_ids: Vec<TenantId>,
    pub is_super_admin: bool,
    pub is_impersonating: bool,
    pub requires_tenant_scope: bool,
}

impl TenantScope {
    /// Scope for a regular tenant member (staff or tenant admin)
    pub fn member(tenant_id: Option<TenantId>, mut tenant_ids: Vec<TenantId>) -> Self {
        if let Some(id) = tenant_id {
            if !tenant_ids.contains(&id) {
                tenant_ids.push(id);
            }
        }
        Self {
            tenant_id,
            tenant_ids,
            is_super_admin: false,
            is_impersonating: false,
            requires_tenant_scope: true,
        }
    }

    /// Global scope for a super admin with no active impersonation
    pub fn super_admin(own_tenant_id: Option<TenantId>, tenant_ids: Vec<TenantId>) -> Self {
        Self {
            tenant_id: own_tenant_id,
            tenant_ids,
            is_super_admin: true,
            is_impersonating: false,
            requires_tenant_scope: false,
        }
    }

    /// Super admin acting as a specific tenant
    pub fn impersonating(impersonated: TenantId) -> Self {
        Self {
            tenant_id: Some(impersonated),
            tenant_ids: vec![impersonated],
            is_super_admin: true,
            is_impersonating: true,
            requires_tenant_scope: true,
        }
    }

    /// Scope for a session with no tenant access at all
    pub fn none() -> Self {
        Self {
            tenant_id: None,
            tenant_ids: Vec::new(),
            is_super_admin: false,
            is_impersonating: false,
            requires_tenant_scope: true,
        }
    }

    /// The tenant id actually governing data access
    ///
    /// Impersonation overrides the actor's own tenant; otherwise this is
    /// the authenticated tenant id.
    pub fn effective_tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    #[test]
    fn test_member_tenant_is_always_listed() {
        let tenant: TenantId = Id::new();
        let scope = TenantScope::member(Some(tenant), vec![]);
        assert!(scope.tenant_ids.contains(&tenant));
        assert!(scope.requires_tenant_scope);
        assert_eq!(scope.effective_tenant_id(), Some(tenant));
    }

    #[test]
    fn test_super_admin_scope_is_global() {
        let scope = TenantScope::super_admin(None, vec![]);
        assert!(scope.is_super_admin);
        assert!(!scope.requires_tenant_scope);
        assert_eq!(scope.effective_tenant_id(), None);
    }

    #[test]
    fn test_impersonation_overrides_own_tenant() {
        let impersonated: TenantId = Id::new();
        let scope = TenantScope::impersonating(impersonated);
        assert!(scope.is_super_admin);
        assert!(scope.is_impersonating);
        assert!(scope.requires_tenant_scope);
        assert_eq!(scope.effective_tenant_id(), Some(impersonated));
    }
}
