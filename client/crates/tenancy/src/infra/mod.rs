//! Infrastructure Layer

pub mod memory;
pub mod rest;

pub use memory::MemoryTenantDirectory;
pub use rest::RestTenantDirectory;
