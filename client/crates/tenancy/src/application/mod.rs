//! Application Layer
//!
//! Scope resolution, mutation validation, and the impersonation manager.

pub mod config;
pub mod impersonation;
pub mod resolve_scope;

// Re-exports
pub use config::TenancyConfig;
pub use impersonation::ImpersonationManager;
pub use resolve_scope::ScopeResolver;
