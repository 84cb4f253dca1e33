//! Domain Layer
//!
//! Contains entities, value objects, and provider ports.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{AuthSnapshot, Identity, RoleAssignment, UserProfile};
pub use repository::{IdentityProvider, ProviderSession, RoleStore, SessionEvent};
pub use value_object::{AuthState, Capability, Diagnostics, Email, Permissions, Role};
