//! Role Value Object
//!
//! Canonical four-tier role model. A deprecated two-tier `admin/staff`
//! model exists in older lineages of the role store; it is intentionally
//! not merged here (the permission semantics are not equivalent), and
//! unknown codes resolve to `Role::None`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// No role assigned; a signed-in user with this role is treated as
    /// unauthenticated for access control
    #[default]
    None,
    Staff,
    TenantAdmin,
    SuperAdmin,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            None => "none",
            Staff => "staff",
            TenantAdmin => "tenant_admin",
            SuperAdmin => "super_admin",
        }
    }

    /// Total mapping from stored role codes
    ///
    /// Unknown codes (including the deprecated two-tier "admin") resolve
    /// to `None` with a warning rather than panicking; access control
    /// fails closed on them.
    #[inline]
    pub fn from_code(code: &str) -> Self {
        use Role::*;
        match code {
            "none" => None,
            "staff" => Staff,
            "tenant_admin" => TenantAdmin,
            "super_admin" => SuperAdmin,
            other => {
                tracing::warn!(code = %other, "Unrecognized role code, treating as no role");
                None
            }
        }
    }

    /// Whether this is a recognized, non-none role
    #[inline]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Role::None)
    }

    /// Tenant-admin standing or higher
    #[inline]
    pub const fn is_admin_tier(&self) -> bool {
        use Role::*;
        matches!(self, TenantAdmin | SuperAdmin)
    }

    #[inline]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Ordering rank for picking the strongest assignment
    #[inline]
    pub const fn rank(&self) -> u8 {
        use Role::*;
        match self {
            None => 0,
            Staff => 1,
            TenantAdmin => 2,
            SuperAdmin => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_code() {
        assert_eq!(Role::from_code("none"), Role::None);
        assert_eq!(Role::from_code("staff"), Role::Staff);
        assert_eq!(Role::from_code("tenant_admin"), Role::TenantAdmin);
        assert_eq!(Role::from_code("super_admin"), Role::SuperAdmin);
    }

    #[test]
    fn test_unknown_code_fails_closed() {
        // Deprecated two-tier lineage must not be merged silently
        assert_eq!(Role::from_code("admin"), Role::None);
        assert_eq!(Role::from_code("owner"), Role::None);
        assert_eq!(Role::from_code(""), Role::None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Staff.to_string(), "staff");
        assert_eq!(Role::TenantAdmin.to_string(), "tenant_admin");
        assert_eq!(Role::SuperAdmin.to_string(), "super_admin");
    }

    #[test]
    fn test_role_checks() {
        assert!(!Role::None.is_recognized());
        assert!(Role::Staff.is_recognized());
        assert!(!Role::Staff.is_admin_tier());
        assert!(Role::TenantAdmin.is_admin_tier());
        assert!(Role::SuperAdmin.is_admin_tier());
        assert!(!Role::TenantAdmin.is_super_admin());
        assert!(Role::SuperAdmin.is_super_admin());
    }

    #[test]
    fn test_rank_ordering() {
        assert!(Role::SuperAdmin.rank() > Role::TenantAdmin.rank());
        assert!(Role::TenantAdmin.rank() > Role::Staff.rank());
        assert!(Role::Staff.rank() > Role::None.rank());
    }
}
