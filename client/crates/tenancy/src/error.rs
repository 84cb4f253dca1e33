//! Tenancy Error Types
//!
//! Tenancy-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. `CrossTenantMutationRejected` is the
//! one variant callers are expected to branch on: it is returned
//! synchronously, before any network call, to abort a mis-scoped write.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::TenantId;
use platform::storage::StorageError;
use thiserror::Error;

/// Tenancy-specific result type alias
pub type TenancyResult<T> = Result<T, TenancyError>;

#[derive(Debug, Error)]
pub enum TenancyError {
    /// A mutation targeted a tenant outside the current effective scope
    #[error("Cross-tenant mutation rejected: target {target} outside effective scope {effective:?}")]
    CrossTenantMutationRejected {
        target: TenantId,
        effective: Option<TenantId>,
    },

    /// Impersonation requested by a non-super-admin
    #[error("Impersonation requires a super admin")]
    NotSuperAdmin,

    /// Suspended tenants cannot be impersonated
    #[error("Tenant {0} is suspended")]
    TenantSuspended(TenantId),

    #[error("Tenant {0} not found")]
    TenantNotFound(TenantId),

    /// Session storage failure
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Tenant directory lookup failure
    #[error("Tenant directory error: {0}")]
    Directory(String),
}

impl TenancyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TenancyError::CrossTenantMutationRejected { .. } => ErrorKind::Forbidden,
            TenancyError::NotSuperAdmin => ErrorKind::Forbidden,
            TenancyError::TenantSuspended(_) => ErrorKind::Forbidden,
            TenancyError::TenantNotFound(_) => ErrorKind::NotFound,
            TenancyError::Storage(_) => ErrorKind::ServiceUnavailable,
            TenancyError::Directory(_) => ErrorKind::InternalServerError,
        }
    }
}

impl From<TenancyError> for AppError {
    fn from(err: TenancyError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}
