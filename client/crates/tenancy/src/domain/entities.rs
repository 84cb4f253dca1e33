//! Tenancy Entities

use chrono::{DateTime, Utc};
use kernel::id::{TenantId, UserId};
use serde::{Deserialize, Serialize};

/// Tenant directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub name: String,
    pub slug: String,
    pub is_suspended: bool,
}

impl Tenant {
    /// The serializable subset carried inside an impersonation session
    pub fn to_ref(&self) -> TenantRef {
        TenantRef {
            tenant_id: self.tenant_id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRef {
    pub tenant_id: TenantId,
    pub name: String,
    pub slug: String,
}

/// Active impersonation, created only by a super admin
///
/// Round-trips through the ephemeral [`platform::storage::SessionStore`]
/// so it survives a reload but never outlives the browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpersonationSession {
    pub actor_user_id: UserId,
    pub tenant: TenantRef,
    pub started_at: DateTime<Utc>,
    pub return_url: Option<String>,
}

impl ImpersonationSession {
    pub fn start_now(actor_user_id: UserId, tenant: TenantRef, return_url: Option<String>) -> Self {
        Self {
            actor_user_id,
            tenant,
            started_at: Utc::now(),
            return_url,
        }
    }
}
