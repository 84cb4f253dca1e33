//! Infrastructure Layer

pub mod memory;
pub mod rest;

pub use memory::{MemoryIdentityProvider, MemoryRoleStore};
pub use rest::{RestAuditSink, RestConfig, RestIdentityProvider, RestRoleStore};
