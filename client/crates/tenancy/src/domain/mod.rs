pub mod entities;
pub mod repository;
pub mod scope;

pub use entities::{ImpersonationSession, Tenant, TenantRef};
pub use repository::{LocalTenantDirectory, TenantDirectory};
pub use scope::TenantScope;
