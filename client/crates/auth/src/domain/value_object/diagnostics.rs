//! Auth Check Diagnostics
//!
//! Attached to each auth-check attempt for support and debugging. Never
//! drives control flow; only surfaced on error screens and audit records.

use chrono::{DateTime, Utc};
use derive_more::Display;
use kernel::id::RequestId;
use serde::Serialize;

/// Outcome of the profile/role leg of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFetchStatus {
    #[default]
    #[display("pending")]
    Pending,
    #[display("ok")]
    Ok,
    #[display("failed")]
    Failed,
    /// Session check found no session, so the profile call was never made
    #[display("skipped")]
    Skipped,
}

/// Per-attempt diagnostic record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub session_found: bool,
    pub profile_fetch: ProfileFetchStatus,
    pub timeout_hit: bool,
    pub request_id: RequestId,
    pub error_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Diagnostics {
    /// Fresh record for one attempt, with a generated request id
    pub fn new_attempt() -> Self {
        Self {
            session_found: false,
            profile_fetch: ProfileFetchStatus::Pending,
            timeout_hit: false,
            request_id: RequestId::new(),
            error_type: None,
            timestamp: Utc::now(),
        }
    }
}
