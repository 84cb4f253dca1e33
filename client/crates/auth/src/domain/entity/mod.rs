//! Entities

pub mod identity;
pub mod profile;
pub mod snapshot;

pub use identity::Identity;
pub use profile::{RoleAssignment, UserProfile};
pub use snapshot::AuthSnapshot;
