//! Application Layer
//!
//! Session resolver, configuration, and the auth state machine.

pub mod check_session;
pub mod config;
pub mod machine;

// Re-exports
pub use check_session::{ProfilePhase, SessionPhase, SessionResolver};
pub use config::AuthConfig;
pub use machine::AuthStateMachine;
