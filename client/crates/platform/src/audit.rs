//! Audit Logging Infrastructure
//!
//! Best-effort, fire-and-forget append of action records to an external
//! audit sink. Logging must never raise, block, or alter the caller's
//! control flow; a failed append is warned and dropped.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Audit action names
///
/// One constant per action so log consumers can rely on stable strings.
pub mod actions {
    pub const SESSION_CHECK_FAILED: &str = "session_check_failed";
    pub const PROFILE_FETCH_FAILED: &str = "profile_fetch_failed";
    pub const MAX_RETRIES_EXCEEDED: &str = "max_retries_exceeded";
    pub const INVALID_ROLE_ACCESS_ATTEMPT: &str = "invalid_role_access_attempt";
    pub const IMPERSONATION_START: &str = "impersonation_start";
    pub const IMPERSONATION_END: &str = "impersonation_end";
    pub const CROSS_TENANT_MUTATION_REJECTED: &str = "cross_tenant_mutation_rejected";
}

/// Append-only audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub action: String,
    pub actor_user_id: Option<Uuid>,
    pub target_user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            actor_user_id: None,
            target_user_id: None,
            tenant_id: None,
            metadata: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn actor(mut self, user_id: Uuid) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn target(mut self, user_id: Uuid) -> Self {
        self.target_user_id = Some(user_id);
        self
    }

    pub fn tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Audit sink trait
///
/// External append-only log store. Implementations live in the feature
/// crates' infra layers (REST) and here (in-memory).
#[trait_variant::make(AuditSink: Send)]
pub trait LocalAuditSink {
    /// Append one entry
    async fn append(&self, entry: AuditEntry) -> Result<(), String>;
}

/// Fire-and-forget audit logger
///
/// Cloneable handle over a shared sink. `log` spawns the append and returns
/// immediately; the spawned task swallows failures with a warning.
#[derive(Debug)]
pub struct AuditLogger<S>
where
    S: AuditSink + Send + Sync + 'static,
{
    sink: Arc<S>,
}

impl<S> Clone for AuditLogger<S>
where
    S: AuditSink + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> AuditLogger<S>
where
    S: AuditSink + Send + Sync + 'static,
{
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Append an entry in the background
    ///
    /// Callable from synchronous code with no runtime in scope; in that
    /// case the entry is warned and dropped rather than panicking.
    pub fn log(&self, entry: AuditEntry) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(action = %entry.action, "Audit entry dropped, no runtime available");
            return;
        };
        let sink = Arc::clone(&self.sink);
        let action = entry.action.clone();
        handle.spawn(async move {
            if let Err(e) = sink.append(entry).await {
                tracing::warn!(action = %action, error = %e, "Audit append failed");
            }
        });
    }

    /// Append an entry and wait for the sink to settle
    ///
    /// Still best-effort: a sink failure is warned, never returned. Used
    /// where ordering matters, e.g. the start entry of an impersonation
    /// must be attempted before the state commit.
    pub async fn log_settled(&self, entry: AuditEntry) {
        let action = entry.action.clone();
        if let Err(e) = self.sink.append(entry).await {
            tracing::warn!(action = %action, error = %e, "Audit append failed");
        }
    }
}

/// In-memory audit sink for tests and the console app
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit sink poisoned").clone()
    }

    pub fn entries_for(&self, action: &str) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }

    /// Yield until at least `n` entries have been appended
    ///
    /// Spawned appends land on the next scheduler turn; tests use this
    /// instead of sleeping.
    pub async fn wait_for(&self, n: usize) {
        for _ in 0..64 {
            if self.entries.lock().expect("audit sink poisoned").len() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: AuditEntry) -> Result<(), String> {
        self.entries.lock().expect("audit sink poisoned").push(entry);
        Ok(())
    }
}

/// Sink that rejects every append, for failure-path tests
#[derive(Debug, Default)]
pub struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    async fn append(&self, _entry: AuditEntry) -> Result<(), String> {
        Err("audit sink offline".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_appends_in_background() {
        let sink = Arc::new(MemoryAuditSink::new());
        let logger = AuditLogger::new(Arc::clone(&sink));

        logger.log(
            AuditEntry::new(actions::IMPERSONATION_START)
                .actor(Uuid::new_v4())
                .tenant(Uuid::new_v4()),
        );

        sink.wait_for(1).await;
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, actions::IMPERSONATION_START);
        assert!(entries[0].actor_user_id.is_some());
    }

    #[test]
    fn test_log_outside_runtime_drops_entry() {
        let sink = Arc::new(MemoryAuditSink::new());
        let logger = AuditLogger::new(Arc::clone(&sink));

        // No runtime here; the entry is dropped instead of panicking
        logger.log(AuditEntry::new(actions::CROSS_TENANT_MUTATION_REJECTED));

        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let logger = AuditLogger::new(Arc::new(FailingAuditSink));

        // Neither call may panic or return an error
        logger.log(AuditEntry::new(actions::SESSION_CHECK_FAILED));
        logger
            .log_settled(AuditEntry::new(actions::SESSION_CHECK_FAILED))
            .await;
    }
}
