//! Auth (Session & Authorization) Client Core
//!
//! Clean Architecture structure:
//! - `domain/` - Auth states, roles, permissions, provider ports
//! - `application/` - Session resolver and the auth state machine
//! - `infra/` - In-memory and REST adapter implementations
//! - `presentation/` - Route guards (pure rendering decisions)
//!
//! ## Features
//! - Timeout-bounded session and profile checks with single-flight
//!   superseding semantics (generation tokens)
//! - Bounded automatic retry, terminal error states with recovery actions
//! - Role-based permission resolution (pure, total)
//! - External session-event subscription (sign-in / sign-out only)
//!
//! ## Security Model
//! - The identity provider owns credentials; this core never stores them
//! - Server-side row policies remain the authoritative enforcement
//!   boundary; client checks exist to fail fast and stay honest
//! - A signed-in user without a recognized role is treated as
//!   unauthenticated for access control

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::machine::AuthStateMachine;
pub use error::{AuthError, AuthResult};
pub use presentation::guards::{GuardOutcome, RouteGuard};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

pub mod guards {
    pub use crate::presentation::guards::*;
}
