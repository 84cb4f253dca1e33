//! Tenancy Configuration

/// Storage key for the persisted impersonation session
pub const IMPERSONATION_STORAGE_KEY: &str = "impersonation_session";

#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Key the impersonation session is persisted under in the ephemeral
    /// session store
    pub impersonation_storage_key: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            impersonation_storage_key: IMPERSONATION_STORAGE_KEY.to_string(),
        }
    }
}
