//! Value Objects

pub mod auth_state;
pub mod diagnostics;
pub mod email;
pub mod permissions;
pub mod role;

pub use auth_state::AuthState;
pub use diagnostics::{Diagnostics, ProfileFetchStatus};
pub use email::Email;
pub use permissions::{Capability, Permissions};
pub use role::Role;
