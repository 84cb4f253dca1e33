//! In-memory tenant directory for tests and the demo console

use std::collections::HashMap;
use std::sync::Mutex;

use kernel::id::TenantId;

use crate::domain::entities::Tenant;
use crate::domain::repository::TenantDirectory;
use crate::error::TenancyResult;

#[derive(Default)]
pub struct MemoryTenantDirectory {
    tenants: Mutex<HashMap<TenantId, Tenant>>,
}

impl MemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant: Tenant) {
        self.tenants
            .lock()
            .expect("directory lock poisoned")
            .insert(tenant.tenant_id, tenant);
    }

    pub fn suspend(&self, tenant_id: TenantId) {
        if let Some(tenant) = self
            .tenants
            .lock()
            .expect("directory lock poisoned")
            .get_mut(&tenant_id)
        {
            tenant.is_suspended = true;
        }
    }
}

impl TenantDirectory for MemoryTenantDirectory {
    async fn find_by_id(&self, tenant_id: TenantId) -> TenancyResult<Option<Tenant>> {
        Ok(self
            .tenants
            .lock()
            .expect("directory lock poisoned")
            .get(&tenant_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use kernel::id::Id;

    use super::*;

    #[tokio::test]
    async fn test_suspend_is_visible_through_lookup() {
        let directory = MemoryTenantDirectory::new();
        let tenant = Tenant {
            tenant_id: Id::new(),
            name: "Sakura Sushi".to_string(),
            slug: "sakura-sushi".to_string(),
            is_suspended: false,
        };
        let id = tenant.tenant_id;
        directory.insert(tenant);

        let found = directory.find_by_id(id).await.unwrap().unwrap();
        assert!(!found.is_suspended);

        directory.suspend(id);
        let found = directory.find_by_id(id).await.unwrap().unwrap();
        assert!(found.is_suspended);

        assert!(directory.find_by_id(Id::new()).await.unwrap().is_none());
    }
}
