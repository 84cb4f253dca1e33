//! Tenancy (Tenant Scope & Impersonation) Client Core
//!
//! Clean Architecture structure:
//! - `domain/` - Tenant entities, scope value, directory port
//! - `application/` - Scope resolution, mutation validation, impersonation
//! - `infra/` - In-memory and REST directory adapters
//! - `presentation/` - Admin scope guard
//!
//! ## Security Model
//! - The effective tenant is derived, never stored: impersonation
//!   overrides the actor's own tenant for the life of the session
//! - Every mutation target is validated against the effective scope
//!   before any network call; mismatches reject synchronously
//! - Impersonation is super-admin-only, fully audited on start and end,
//!   and lives in ephemeral session storage

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::TenancyConfig;
pub use application::impersonation::ImpersonationManager;
pub use application::resolve_scope::ScopeResolver;
pub use domain::entities::{ImpersonationSession, Tenant, TenantRef};
pub use domain::scope::TenantScope;
pub use error::{TenancyError, TenancyResult};
pub use presentation::guards::AdminScopeGuard;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::scope::*;
}

pub mod guards {
    pub use crate::presentation::guards::*;
}
