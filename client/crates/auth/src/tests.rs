//! State machine integration tests
//!
//! Exercise the full bootstrap / retry / supersede / sign-out lifecycle
//! against scripted providers. Timeout paths run under paused tokio time
//! so no test waits for a real 4-second deadline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use platform::audit::{AuditLogger, FailingAuditSink, MemoryAuditSink, actions};
use tokio::sync::{broadcast, watch};

use crate::application::config::AuthConfig;
use crate::application::machine::AuthStateMachine;
use crate::domain::entity::identity::Identity;
use crate::domain::entity::snapshot::AuthSnapshot;
use crate::domain::repository::{IdentityProvider, ProviderSession, SessionEvent};
use crate::domain::value_object::auth_state::AuthState;
use crate::domain::value_object::email::Email;
use crate::domain::value_object::role::Role;
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::{MemoryIdentityProvider, MemoryRoleStore};
use kernel::id::{Id, UserId};

/// Identity provider whose behavior is flipped per test
struct ScriptedProvider {
    identity: Identity,
    session_calls: AtomicU32,
    fail_get_session: AtomicBool,
    hang_get_session: AtomicBool,
    fail_sign_out: AtomicBool,
    signed_out: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

impl ScriptedProvider {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            identity: Identity::new(
                Id::new(),
                Email::from_provider("scripted@example.com"),
            ),
            session_calls: AtomicU32::new(0),
            fail_get_session: AtomicBool::new(false),
            hang_get_session: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            signed_out: AtomicBool::new(false),
            events,
        })
    }

    fn session_calls(&self) -> u32 {
        self.session_calls.load(Ordering::SeqCst)
    }

    fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

impl IdentityProvider for ScriptedProvider {
    async fn get_session(&self) -> AuthResult<Option<ProviderSession>> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_get_session.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(AuthError::SessionCheckFailed("scripted failure".into()));
        }
        Ok(Some(ProviderSession {
            identity: self.identity.clone(),
        }))
    }

    async fn sign_in_with_password(
        &self,
        _email: &Email,
        _password: &str,
    ) -> AuthResult<ProviderSession> {
        Ok(ProviderSession {
            identity: self.identity.clone(),
        })
    }

    async fn sign_up(&self, _email: &Email, _password: &str, _redirect_to: &str) -> AuthResult<()> {
        Ok(())
    }

    async fn sign_out_global(&self) -> AuthResult<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("network unreachable".into()));
        }
        self.signed_out.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn update_password(&self, _new_password: &str) -> AuthResult<()> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

async fn wait_for_state(rx: &mut watch::Receiver<AuthSnapshot>, state: AuthState) -> AuthSnapshot {
    rx.wait_for(|s| s.state == state)
        .await
        .expect("machine dropped while waiting")
        .clone()
}

fn fast_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::fast())
}

#[tokio::test(start_paused = true)]
async fn test_failing_session_check_retries_once_then_error_timeout() {
    let provider = ScriptedProvider::new();
    provider.fail_get_session.store(true, Ordering::SeqCst);
    let sink = Arc::new(MemoryAuditSink::new());
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        Arc::new(MemoryRoleStore::new()),
        AuditLogger::new(Arc::clone(&sink)),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();

    let snapshot = wait_for_state(&mut rx, AuthState::ErrorTimeout).await;
    assert_eq!(provider.session_calls(), 2, "one automatic retry, no more");
    let diagnostics = snapshot.diagnostics.expect("terminal error carries diagnostics");
    assert!(!diagnostics.session_found);
    assert_eq!(diagnostics.error_type.as_deref(), Some("session_check_failed"));

    sink.wait_for(1).await;
    assert_eq!(sink.entries_for(actions::SESSION_CHECK_FAILED).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_provider_hits_timeout_and_records_it() {
    let provider = ScriptedProvider::new();
    provider.hang_get_session.store(true, Ordering::SeqCst);
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        Arc::new(MemoryRoleStore::new()),
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();

    let snapshot = wait_for_state(&mut rx, AuthState::ErrorTimeout).await;
    let diagnostics = snapshot.diagnostics.expect("diagnostics");
    assert!(diagnostics.timeout_hit);
    assert_eq!(
        diagnostics.error_type.as_deref(),
        Some("session_check_timeout")
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_exhaustion_resets_budget_and_recovers() {
    let provider = ScriptedProvider::new();
    provider.fail_get_session.store(true, Ordering::SeqCst);
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(provider.user_id(), Role::Staff, Some(Id::new()));
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::ErrorTimeout).await;

    provider.fail_get_session.store(false, Ordering::SeqCst);
    machine.retry();

    let snapshot = wait_for_state(&mut rx, AuthState::Ready).await;
    assert_eq!(snapshot.role, Role::Staff);
    assert!(snapshot.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_external_sign_in_refused_after_retries_exhausted() {
    let provider = ScriptedProvider::new();
    provider.fail_get_session.store(true, Ordering::SeqCst);
    let sink = Arc::new(MemoryAuditSink::new());
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        Arc::new(MemoryRoleStore::new()),
        AuditLogger::new(Arc::clone(&sink)),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::ErrorTimeout).await;
    let calls_after_bootstrap = provider.session_calls();

    provider.emit(SessionEvent::SignedIn);
    sink.wait_for(2).await;

    assert_eq!(sink.entries_for(actions::MAX_RETRIES_EXCEEDED).len(), 1);
    assert_eq!(
        provider.session_calls(),
        calls_after_bootstrap,
        "an exhausted machine must not fire another check on its own"
    );
    assert_eq!(machine.snapshot().state, AuthState::ErrorTimeout);
}

#[tokio::test(start_paused = true)]
async fn test_token_refresh_event_is_ignored() {
    let provider = ScriptedProvider::new();
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(provider.user_id(), Role::TenantAdmin, Some(Id::new()));
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::Ready).await;
    let calls = provider.session_calls();

    provider.emit(SessionEvent::TokenRefreshed);
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(machine.snapshot().state, AuthState::Ready);
    assert_eq!(provider.session_calls(), calls, "no profile reload on refresh");
}

#[tokio::test(start_paused = true)]
async fn test_external_sign_out_clears_state() {
    let provider = ScriptedProvider::new();
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(provider.user_id(), Role::Staff, Some(Id::new()));
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::Ready).await;

    provider.emit(SessionEvent::SignedOut);
    let snapshot = wait_for_state(&mut rx, AuthState::Unauthenticated).await;
    assert!(snapshot.user.is_none());
    assert_eq!(snapshot.role, Role::None);
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_clears_locally_even_when_remote_fails() {
    let provider = ScriptedProvider::new();
    provider.fail_sign_out.store(true, Ordering::SeqCst);
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(provider.user_id(), Role::Staff, Some(Id::new()));
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::Ready).await;

    machine.sign_out();

    // Local state is already cleared before the remote call settles
    assert_eq!(machine.snapshot().state, AuthState::Unauthenticated);
    assert!(machine.snapshot().user.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_check_never_overwrites_newer_state() {
    let provider = ScriptedProvider::new();
    provider.hang_get_session.store(true, Ordering::SeqCst);
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        Arc::new(MemoryRoleStore::new()),
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    machine.bootstrap();
    tokio::task::yield_now().await;
    assert_eq!(machine.snapshot().state, AuthState::CheckingSession);

    // Abandon the hung check; its eventual timeout result must be dropped
    machine.go_to_login();
    assert_eq!(machine.snapshot().state, AuthState::Unauthenticated);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(machine.snapshot().state, AuthState::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_roleless_user_lands_ready_but_unauthenticated_with_audit() {
    let provider = ScriptedProvider::new();
    let sink = Arc::new(MemoryAuditSink::new());
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        Arc::new(MemoryRoleStore::new()),
        AuditLogger::new(Arc::clone(&sink)),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();

    let snapshot = wait_for_state(&mut rx, AuthState::Ready).await;
    assert!(snapshot.user.is_some());
    assert_eq!(snapshot.role, Role::None);
    assert!(!snapshot.is_authenticated());

    sink.wait_for(1).await;
    let entries = sink.entries_for(actions::INVALID_ROLE_ACCESS_ATTEMPT);
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].actor_user_id,
        Some(provider.user_id().into_uuid())
    );
}

#[tokio::test(start_paused = true)]
async fn test_transition_order_through_happy_path() {
    let provider = ScriptedProvider::new();
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(provider.user_id(), Role::TenantAdmin, Some(Id::new()));
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();

    let mut seen = vec![rx.borrow_and_update().state];
    while *seen.last().unwrap() != AuthState::Ready {
        rx.changed().await.expect("machine dropped");
        seen.push(rx.borrow_and_update().state);
    }

    // The watch channel coalesces back-to-back commits, so observers may
    // skip intermediate states but must never see them out of order
    let order = [
        AuthState::Init,
        AuthState::CheckingSession,
        AuthState::Authenticated,
        AuthState::LoadingProfile,
        AuthState::Ready,
    ];
    let mut cursor = 0;
    for state in &seen {
        let position = order[cursor..]
            .iter()
            .position(|s| s == state)
            .unwrap_or_else(|| panic!("unexpected transition to {state:?} in {seen:?}"));
        cursor += position;
    }
    assert_eq!(*seen.last().unwrap(), AuthState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_hard_refresh_starts_over_from_init() {
    let provider = ScriptedProvider::new();
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(provider.user_id(), Role::Staff, Some(Id::new()));
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::Ready).await;

    machine.hard_refresh();
    let snapshot = wait_for_state(&mut rx, AuthState::Ready).await;
    assert!(snapshot.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_failing_audit_sink_never_blocks_resolution() {
    let provider = ScriptedProvider::new();
    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        Arc::new(MemoryRoleStore::new()),
        AuditLogger::new(Arc::new(FailingAuditSink)),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();

    // Roleless user triggers an audit write against a sink that always
    // fails; the machine must still reach Ready
    let snapshot = wait_for_state(&mut rx, AuthState::Ready).await;
    assert_eq!(snapshot.state, AuthState::Ready);
}

#[tokio::test]
async fn test_sign_in_flow_with_memory_provider() {
    let provider = Arc::new(MemoryIdentityProvider::new());
    let user_id: UserId = Id::new();
    provider.seed_user("admin@example.com", "correct horse", user_id);
    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(user_id, Role::TenantAdmin, Some(Id::new()));

    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::new(MemoryAuditSink::new())),
        fast_config(),
    );
    let mut rx = machine.subscribe();
    machine.bootstrap();
    wait_for_state(&mut rx, AuthState::Unauthenticated).await;

    assert!(matches!(
        machine.sign_in("admin@example.com", "wrong").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert_eq!(machine.snapshot().state, AuthState::Unauthenticated);

    machine
        .sign_in("admin@example.com", "correct horse")
        .await
        .expect("sign-in");
    let snapshot = wait_for_state(&mut rx, AuthState::Ready).await;
    assert_eq!(snapshot.role, Role::TenantAdmin);
}
