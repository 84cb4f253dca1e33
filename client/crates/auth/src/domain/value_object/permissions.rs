//! Permission Resolver
//!
//! Pure mapping from a role to a fixed-shape capability record. This is
//! the basis for UI gating and a first line of defense before server-side
//! authorization, which remains authoritative.

use derive_more::Display;
use serde::Serialize;

use super::role::Role;

/// Individual capability, for guard requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Capability {
    #[display("manage_menu")]
    ManageMenu,
    #[display("manage_tables")]
    ManageTables,
    #[display("access_analytics")]
    AccessAnalytics,
    #[display("manage_bank_details")]
    ManageBankDetails,
    #[display("manage_users")]
    ManageUsers,
    #[display("reset_passwords")]
    ResetPasswords,
    #[display("assign_roles")]
    AssignRoles,
    #[display("access_orders")]
    AccessOrders,
    #[display("modify_own_password")]
    ModifyOwnPassword,
}

/// Fixed-shape capability record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Permissions {
    pub manage_menu: bool,
    pub manage_tables: bool,
    pub access_analytics: bool,
    pub manage_bank_details: bool,
    pub manage_users: bool,
    pub reset_passwords: bool,
    pub assign_roles: bool,
    pub access_orders: bool,
    pub modify_own_password: bool,
}

impl Permissions {
    /// All capabilities denied
    pub const NONE: Permissions = Permissions {
        manage_menu: false,
        manage_tables: false,
        access_analytics: false,
        manage_bank_details: false,
        manage_users: false,
        reset_passwords: false,
        assign_roles: false,
        access_orders: false,
        modify_own_password: false,
    };

    /// All capabilities granted
    pub const ALL: Permissions = Permissions {
        manage_menu: true,
        manage_tables: true,
        access_analytics: true,
        manage_bank_details: true,
        manage_users: true,
        reset_passwords: true,
        assign_roles: true,
        access_orders: true,
        modify_own_password: true,
    };

    /// Resolve the capability set for a role
    ///
    /// Total and side-effect-free: every role value maps, `Role::None`
    /// (which unknown codes collapse into) maps to all-false.
    pub const fn for_role(role: Role) -> Permissions {
        match role {
            Role::None => Permissions::NONE,
            Role::Staff => Permissions {
                access_orders: true,
                modify_own_password: true,
                ..Permissions::NONE
            },
            Role::TenantAdmin => Permissions::ALL,
            Role::SuperAdmin => Permissions::ALL,
        }
    }

    /// Query a single capability
    pub const fn has(&self, capability: Capability) -> bool {
        use Capability::*;
        match capability {
            ManageMenu => self.manage_menu,
            ManageTables => self.manage_tables,
            AccessAnalytics => self.access_analytics,
            ManageBankDetails => self.manage_bank_details,
            ManageUsers => self.manage_users,
            ResetPasswords => self.reset_passwords,
            AssignRoles => self.assign_roles,
            AccessOrders => self.access_orders,
            ModifyOwnPassword => self.modify_own_password,
        }
    }
}
