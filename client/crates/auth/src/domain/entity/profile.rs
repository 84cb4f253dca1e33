//! User Profile Entity
//!
//! The role/tenant projection resolved at session time from the role
//! store. Zero assignments is a valid state meaning "no role assigned".

use kernel::id::TenantId;

use crate::domain::value_object::role::Role;

/// One role-store row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: Role,
    /// Super admins carry no tenant binding
    pub tenant_id: Option<TenantId>,
}

/// Resolved role + tenant scope for one user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub role: Role,
    /// Primary tenant: the tenant bound to the strongest assignment
    pub tenant_id: Option<TenantId>,
    /// Every tenant the user holds an assignment in
    pub tenant_ids: Vec<TenantId>,
}

impl UserProfile {
    /// Collapse role-store rows into a profile
    ///
    /// The strongest role wins; its tenant becomes the primary tenant.
    /// An empty row set yields `Role::None` with no tenant scope.
    pub fn from_assignments(assignments: Vec<RoleAssignment>) -> Self {
        let mut profile = UserProfile::default();

        for assignment in &assignments {
            if assignment.role.rank() > profile.role.rank() {
                profile.role = assignment.role;
                profile.tenant_id = assignment.tenant_id;
            }
            if let Some(tenant_id) = assignment.tenant_id {
                if !profile.tenant_ids.contains(&tenant_id) {
                    profile.tenant_ids.push(tenant_id);
                }
            }
        }

        profile
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    #[test]
    fn test_empty_assignments_mean_no_role() {
        let profile = UserProfile::from_assignments(vec![]);
        assert_eq!(profile.role, Role::None);
        assert!(profile.tenant_id.is_none());
        assert!(profile.tenant_ids.is_empty());
    }

    #[test]
    fn test_strongest_role_wins() {
        let tenant_a: TenantId = Id::new();
        let tenant_b: TenantId = Id::new();

        let profile = UserProfile::from_assignments(vec![
            RoleAssignment {
                role: Role::Staff,
                tenant_id: Some(tenant_a),
            },
            RoleAssignment {
                role: Role::TenantAdmin,
                tenant_id: Some(tenant_b),
            },
        ]);

        assert_eq!(profile.role, Role::TenantAdmin);
        assert_eq!(profile.tenant_id, Some(tenant_b));
        assert_eq!(profile.tenant_ids, vec![tenant_a, tenant_b]);
    }

    #[test]
    fn test_super_admin_without_tenant() {
        let profile = UserProfile::from_assignments(vec![RoleAssignment {
            role: Role::SuperAdmin,
            tenant_id: None,
        }]);

        assert!(profile.is_super_admin());
        assert!(profile.tenant_id.is_none());
        assert!(profile.tenant_ids.is_empty());
    }

    #[test]
    fn test_duplicate_tenants_deduplicated() {
        let tenant: TenantId = Id::new();
        let profile = UserProfile::from_assignments(vec![
            RoleAssignment {
                role: Role::Staff,
                tenant_id: Some(tenant),
            },
            RoleAssignment {
                role: Role::TenantAdmin,
                tenant_id: Some(tenant),
            },
        ]);
        assert_eq!(profile.tenant_ids.len(), 1);
    }
}
