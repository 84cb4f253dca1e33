//! Auth State Machine
//!
//! Owns the observable [`AuthSnapshot`], orchestrates bounded retries of
//! the session resolver, and listens for external session-change events.
//! Constructed once by the application root and injected into guards and
//! hooks; multiple instances can coexist (tests rely on this).
//!
//! Concurrency model: only one check is "current" at a time. Starting a
//! new check bumps the generation counter and aborts the previous task;
//! a late result from a superseded check is discarded at commit time by
//! re-checking its token under the machine lock.

use std::sync::{Arc, Mutex, Weak};

use platform::audit::{AuditEntry, AuditLogger, AuditSink, actions};
use platform::cancel::{CheckToken, GenerationCounter};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::application::check_session::{ProfilePhase, SessionPhase, SessionResolver};
use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::entity::snapshot::AuthSnapshot;
use crate::domain::repository::{IdentityProvider, RoleStore, SessionEvent};
use crate::domain::value_object::diagnostics::Diagnostics;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

struct MachineInner {
    check_task: Option<JoinHandle<()>>,
    listener_task: Option<JoinHandle<()>>,
    /// Set when the automatic retry bound was exhausted; only a user
    /// action (retry, sign-in, hard refresh) clears it
    retries_exhausted: bool,
}

/// Client-side auth state machine
pub struct AuthStateMachine<P, R, A>
where
    P: IdentityProvider + Send + Sync + 'static,
    R: RoleStore + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    resolver: SessionResolver<P, R>,
    provider: Arc<P>,
    audit: AuditLogger<A>,
    config: Arc<AuthConfig>,
    generations: GenerationCounter,
    snapshot_tx: watch::Sender<AuthSnapshot>,
    inner: Mutex<MachineInner>,
    /// Handle to ourselves for spawned tasks; weak so background tasks
    /// never keep a closed machine alive
    weak: Weak<Self>,
}

impl<P, R, A> AuthStateMachine<P, R, A>
where
    P: IdentityProvider + Send + Sync + 'static,
    R: RoleStore + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(
        provider: Arc<P>,
        roles: Arc<R>,
        audit: AuditLogger<A>,
        config: Arc<AuthConfig>,
    ) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(AuthSnapshot::initial());
        Arc::new_cyclic(|weak| Self {
            resolver: SessionResolver::new(Arc::clone(&provider), roles, Arc::clone(&config)),
            provider,
            audit,
            config,
            generations: GenerationCounter::new(),
            snapshot_tx,
            inner: Mutex::new(MachineInner {
                check_task: None,
                listener_task: None,
                retries_exhausted: false,
            }),
            weak: weak.clone(),
        })
    }

    /// Start the event listener and run the initial session check
    pub fn bootstrap(&self) {
        self.spawn_listener();
        self.start_check(true);
    }

    /// Current snapshot
    pub fn snapshot(&self) -> AuthSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Observe snapshot transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Password sign-in; re-checks the session on success
    ///
    /// Errors are returned, never panicked, and leave the machine state
    /// untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        match self.provider.sign_in_with_password(&email, password).await {
            Ok(_session) => {
                self.start_check(true);
                Ok(())
            }
            Err(e) => {
                e.log();
                Err(e)
            }
        }
    }

    /// Registration with the configured confirmation redirect
    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        self.provider
            .sign_up(&email, password, &self.config.signup_redirect_url)
            .await
            .inspect_err(|e| e.log())
    }

    /// Change the current user's password at the provider
    pub async fn update_password(&self, new_password: &str) -> AuthResult<()> {
        self.provider.update_password(new_password).await
    }

    /// Sign out: local state is cleared synchronously, then the provider's
    /// global sign-out runs in the background with its error swallowed,
    /// so the UI is never stuck on a failed remote call
    pub fn sign_out(&self) {
        self.force_unauthenticated();

        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            if let Err(e) = provider.sign_out_global().await {
                tracing::warn!(error = %e, "Global sign-out failed after local clear");
            }
        });
        tracing::info!("User signed out");
    }

    /// Abandon a stuck check and return to the login screen, without
    /// calling the provider
    pub fn go_to_login(&self) {
        self.force_unauthenticated();
    }

    /// User-initiated retry: resets the retry budget and re-checks
    pub fn retry(&self) {
        self.start_check(true);
    }

    /// Escape hatch: drop every piece of local state and start over from
    /// a fresh bootstrap, the library equivalent of a full page reload
    pub fn hard_refresh(&self) {
        {
            let mut inner = self.inner.lock().expect("machine lock poisoned");
            self.generations.invalidate_all();
            if let Some(task) = inner.check_task.take() {
                task.abort();
            }
            inner.retries_exhausted = false;
            self.snapshot_tx.send_replace(AuthSnapshot::initial());
        }
        tracing::info!("Hard refresh requested");
        self.start_check(true);
    }

    /// Cancel all pending work (component unmount)
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("machine lock poisoned");
        self.generations.invalidate_all();
        if let Some(task) = inner.check_task.take() {
            task.abort();
        }
        if let Some(task) = inner.listener_task.take() {
            task.abort();
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Begin a new session check, superseding any in-flight one
    fn start_check(&self, reset_retry_budget: bool) {
        let token;
        {
            let mut inner = self.inner.lock().expect("machine lock poisoned");
            if reset_retry_budget {
                inner.retries_exhausted = false;
            }
            token = self.generations.next_token();
            if let Some(task) = inner.check_task.take() {
                task.abort();
            }
            let previous = self.snapshot_tx.borrow().clone();
            self.snapshot_tx
                .send_replace(AuthSnapshot::checking_session(&previous));

            let weak = self.weak.clone();
            let check_token = token.clone();
            inner.check_task = Some(tokio::spawn(async move {
                if let Some(machine) = weak.upgrade() {
                    machine.run_check(check_token).await;
                }
            }));
        }
        tracing::debug!(generation = token.generation(), "Session check started");
    }

    async fn run_check(self: Arc<Self>, token: CheckToken) {
        let max_attempts = self.config.max_auto_retries + 1;
        let mut attempt = 0u32;

        while attempt < max_attempts {
            attempt += 1;
            let mut diagnostics = Diagnostics::new_attempt();

            let session = match self.resolver.check_session(&token, &mut diagnostics).await {
                SessionPhase::Superseded => return,
                SessionPhase::NoSession => {
                    self.commit(&token, AuthSnapshot::unauthenticated());
                    return;
                }
                SessionPhase::Failed { timed_out } => {
                    if attempt < max_attempts {
                        tracing::warn!(
                            attempt,
                            timed_out,
                            request_id = %diagnostics.request_id,
                            "Session check failed, retrying once"
                        );
                        continue;
                    }
                    self.inner
                        .lock()
                        .expect("machine lock poisoned")
                        .retries_exhausted = true;
                    self.audit_check_failure(actions::SESSION_CHECK_FAILED, None, &diagnostics);
                    self.commit(&token, AuthSnapshot::error_timeout(diagnostics));
                    return;
                }
                SessionPhase::Found(session) => session,
            };

            let identity = session.identity;
            if !self.commit(&token, AuthSnapshot::session_found(identity.clone())) {
                return;
            }
            if !self.commit(&token, AuthSnapshot::loading_profile(identity.clone())) {
                return;
            }

            match self
                .resolver
                .fetch_profile(&token, identity.user_id, &mut diagnostics)
                .await
            {
                ProfilePhase::Superseded => return,
                ProfilePhase::Failed { timed_out } => {
                    tracing::warn!(
                        timed_out,
                        request_id = %diagnostics.request_id,
                        "Profile fetch failed"
                    );
                    self.audit_check_failure(
                        actions::PROFILE_FETCH_FAILED,
                        Some(&identity),
                        &diagnostics,
                    );
                    self.commit(&token, AuthSnapshot::error_profile(identity, diagnostics));
                }
                ProfilePhase::Resolved(profile) => {
                    if !profile.role.is_recognized() {
                        // Signed in, but access control treats this user
                        // as unauthenticated
                        tracing::warn!(
                            user_id = %identity.user_id,
                            "Signed-in user has no recognized role"
                        );
                        self.audit.log(
                            AuditEntry::new(actions::INVALID_ROLE_ACCESS_ATTEMPT)
                                .actor(identity.user_id.into_uuid()),
                        );
                    }
                    self.inner
                        .lock()
                        .expect("machine lock poisoned")
                        .retries_exhausted = false;
                    tracing::info!(
                        user_id = %identity.user_id,
                        role = %profile.role,
                        "Session check resolved"
                    );
                    self.commit(&token, AuthSnapshot::ready(identity, profile, diagnostics));
                }
            }
            return;
        }
    }

    /// Commit a snapshot iff the token is still current
    ///
    /// The machine lock serializes this against generation bumps so a
    /// stale check can never overwrite a newer state.
    fn commit(&self, token: &CheckToken, snapshot: AuthSnapshot) -> bool {
        let _inner = self.inner.lock().expect("machine lock poisoned");
        if token.is_superseded() {
            tracing::debug!(
                generation = token.generation(),
                "Discarding result from superseded check"
            );
            return false;
        }
        self.snapshot_tx.send_replace(snapshot);
        true
    }

    /// Force `Unauthenticated` immediately, cancelling in-flight checks
    fn force_unauthenticated(&self) {
        let mut inner = self.inner.lock().expect("machine lock poisoned");
        self.generations.invalidate_all();
        if let Some(task) = inner.check_task.take() {
            task.abort();
        }
        inner.retries_exhausted = false;
        self.snapshot_tx.send_replace(AuthSnapshot::unauthenticated());
    }

    /// External sign-in event: re-check unless the retry budget is spent
    fn on_external_sign_in(&self) {
        let exhausted = self
            .inner
            .lock()
            .expect("machine lock poisoned")
            .retries_exhausted;
        if exhausted {
            AuthError::MaxRetriesExceeded.log();
            self.audit
                .log(AuditEntry::new(actions::MAX_RETRIES_EXCEEDED));
            return;
        }
        self.start_check(false);
    }

    fn audit_check_failure(
        &self,
        action: &'static str,
        identity: Option<&Identity>,
        diagnostics: &Diagnostics,
    ) {
        let mut entry = AuditEntry::new(action).metadata(serde_json::json!({
            "request_id": diagnostics.request_id.to_string(),
            "timeout_hit": diagnostics.timeout_hit,
            "error_type": diagnostics.error_type,
        }));
        if let Some(identity) = identity {
            entry = entry.actor(identity.user_id.into_uuid());
        }
        self.audit.log(entry);
    }

    /// Observe the provider's session-change stream
    ///
    /// Exactly two event kinds are acted on; in particular a token
    /// refresh must not re-trigger a full profile reload.
    fn spawn_listener(&self) {
        let mut events = self.provider.subscribe();
        let weak = self.weak.clone();
        let handle = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session event stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(machine) = weak.upgrade() else { break };
                match event {
                    SessionEvent::SignedIn => machine.on_external_sign_in(),
                    SessionEvent::SignedOut => machine.force_unauthenticated(),
                    SessionEvent::TokenRefreshed
                    | SessionEvent::PasswordRecovery
                    | SessionEvent::UserUpdated => {}
                }
            }
        });
        self.inner
            .lock()
            .expect("machine lock poisoned")
            .listener_task = Some(handle);
    }
}

impl<P, R, A> Drop for AuthStateMachine<P, R, A>
where
    P: IdentityProvider + Send + Sync + 'static,
    R: RoleStore + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(task) = inner.check_task.take() {
                task.abort();
            }
            if let Some(task) = inner.listener_task.take() {
                task.abort();
            }
        }
    }
}
