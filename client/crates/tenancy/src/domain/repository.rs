//! Tenant Directory Port

use kernel::id::TenantId;

use crate::domain::entities::Tenant;
use crate::error::TenancyResult;

/// Lookup of tenant metadata for suspension checks and impersonation
/// display
#[trait_variant::make(TenantDirectory: Send)]
pub trait LocalTenantDirectory {
    async fn find_by_id(&self, tenant_id: TenantId) -> TenancyResult<Option<Tenant>>;
}
