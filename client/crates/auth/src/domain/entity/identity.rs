//! Identity Entity
//!
//! Opaque record owned by the external identity provider. Referenced by
//! the rest of the core, never copied into local durable state.

use kernel::id::UserId;

use crate::domain::value_object::email::Email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
}

impl Identity {
    pub fn new(user_id: UserId, email: Email) -> Self {
        Self { user_id, email }
    }
}
