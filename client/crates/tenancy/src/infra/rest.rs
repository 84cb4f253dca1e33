//! PostgREST tenant directory adapter

use serde::Deserialize;
use uuid::Uuid;

use auth::infra::rest::RestConfig;
use kernel::id::{Id, TenantId};

use crate::domain::entities::Tenant;
use crate::domain::repository::TenantDirectory;
use crate::error::{TenancyError, TenancyResult};

#[derive(Debug, Deserialize)]
struct TenantRowDto {
    id: Uuid,
    name: String,
    slug: String,
    is_suspended: bool,
}

pub struct RestTenantDirectory {
    http: reqwest::Client,
    config: RestConfig,
}

impl RestTenantDirectory {
    pub fn new(config: RestConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl TenantDirectory for RestTenantDirectory {
    async fn find_by_id(&self, tenant_id: TenantId) -> TenancyResult<Option<Tenant>> {
        let url = format!(
            "{}/rest/v1/tenants?select=id,name,slug,is_suspended&id=eq.{}",
            self.config.base_url, tenant_id
        );
        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.anon_key)
            .send()
            .await
            .map_err(|e| TenancyError::Directory(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TenancyError::Directory(format!(
                "Tenant directory returned {}",
                response.status()
            )));
        }

        let rows: Vec<TenantRowDto> = response
            .json()
            .await
            .map_err(|e| TenancyError::Directory(e.to_string()))?;

        Ok(rows.into_iter().next().map(|row| Tenant {
            tenant_id: Id::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            is_suspended: row.is_suspended,
        }))
    }
}
