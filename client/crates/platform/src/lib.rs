//! Platform Infrastructure
//!
//! Infrastructure utilities shared by the client-core crates:
//! - `storage` - ephemeral session-scoped key-value storage
//! - `cancel` - generation-counter cancellation for superseding async checks
//! - `audit` - fire-and-forget audit logging

pub mod audit;
pub mod cancel;
pub mod storage;
