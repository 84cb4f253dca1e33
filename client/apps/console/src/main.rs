//! Admin Console Smoke Binary
//!
//! Wires the auth and tenancy cores against the in-memory adapters and
//! walks the full privileged lifecycle: bootstrap, sign-in, impersonation,
//! scoped mutation validation, cross-tenant rejection, sign-out. Prints
//! every observed snapshot transition and the resulting audit trail.
//!
//! Uses `anyhow` for startup errors; application-level errors stay typed
//! (`AuthError`, `TenancyError`).

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::models::{AuthSnapshot, AuthState, Role};
use auth::{AuthConfig, AuthStateMachine};
use kernel::id::{Id, TenantId, UserId};
use platform::audit::{AuditLogger, MemoryAuditSink};
use platform::storage::MemorySessionStore;
use tenancy::infra::MemoryTenantDirectory;
use tenancy::models::Tenant;
use tenancy::{
    AdminScopeGuard, ImpersonationManager, ScopeResolver, TenancyConfig, TenancyError,
};

use auth::infra::{MemoryIdentityProvider, MemoryRoleStore};
use tenancy::domain::TenantDirectory;

const SUPER_ADMIN_EMAIL: &str = "root@platform.example";
const SUPER_ADMIN_PASSWORD: &str = "correct horse battery staple";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "console=info,auth=info,tenancy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ------------------------------------------------------------------
    // Seed the in-memory world: two tenants, a super admin, a tenant admin
    // ------------------------------------------------------------------
    let tenant_a = Tenant {
        tenant_id: Id::new(),
        name: "Sakura Sushi".to_string(),
        slug: "sakura-sushi".to_string(),
        is_suspended: false,
    };
    let tenant_b = Tenant {
        tenant_id: Id::new(),
        name: "Ramen Yokocho".to_string(),
        slug: "ramen-yokocho".to_string(),
        is_suspended: false,
    };

    let directory = Arc::new(MemoryTenantDirectory::new());
    directory.insert(tenant_a.clone());
    directory.insert(tenant_b.clone());

    let super_admin_id: UserId = Id::new();
    let tenant_admin_id: UserId = Id::new();

    let provider = Arc::new(MemoryIdentityProvider::new());
    provider.seed_user(SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD, super_admin_id);
    provider.seed_user("owner@sakura-sushi.example", "hunter2hunter2", tenant_admin_id);

    let roles = Arc::new(MemoryRoleStore::new());
    roles.assign(super_admin_id, Role::SuperAdmin, None);
    roles.assign(tenant_admin_id, Role::TenantAdmin, Some(tenant_a.tenant_id));

    let audit_sink = Arc::new(MemoryAuditSink::new());
    let storage = Arc::new(MemorySessionStore::new());

    let machine = AuthStateMachine::new(
        Arc::clone(&provider),
        roles,
        AuditLogger::new(Arc::clone(&audit_sink)),
        Arc::new(AuthConfig::default()),
    );
    let impersonation = ImpersonationManager::new(
        Arc::clone(&storage),
        AuditLogger::new(Arc::clone(&audit_sink)),
        TenancyConfig::default(),
    );
    let resolver = ScopeResolver::new(AuditLogger::new(Arc::clone(&audit_sink)));
    let admin_guard = AdminScopeGuard::new();

    // ------------------------------------------------------------------
    // Bootstrap: no live session yet
    // ------------------------------------------------------------------
    let mut snapshots = machine.subscribe();
    machine.bootstrap();
    wait_for(&mut snapshots, AuthState::Unauthenticated).await;

    // ------------------------------------------------------------------
    // Sign in as the super admin
    // ------------------------------------------------------------------
    machine.sign_in(SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await?;
    let snapshot = wait_for(&mut snapshots, AuthState::Ready).await;
    tracing::info!(
        role = %snapshot.role,
        tenant = ?snapshot.tenant_id,
        "Signed in"
    );

    // A super admin cannot operate the admin console without picking a
    // tenant first
    let outcome = admin_guard.evaluate(&snapshot, impersonation.is_impersonating());
    tracing::info!(?outcome, "Admin guard before impersonation");

    // ------------------------------------------------------------------
    // Impersonate tenant A and validate scoped mutations
    // ------------------------------------------------------------------
    let target = directory
        .find_by_id(tenant_a.tenant_id)
        .await?
        .expect("seeded tenant");
    let session = impersonation
        .start(&snapshot, &target, Some("/admin/orders".to_string()))
        .await?;
    tracing::info!(tenant = %session.tenant.name, "Impersonation active");

    let outcome = admin_guard.evaluate(&snapshot, impersonation.is_impersonating());
    tracing::info!(?outcome, "Admin guard while impersonating");

    let scope = resolver.resolve(&snapshot, Some(&session));
    tracing::info!(effective = ?scope.effective_tenant_id(), "Scope resolved");

    demo_mutation(&resolver, &scope, Some(tenant_a.tenant_id), "menu update for tenant A");
    demo_mutation(&resolver, &scope, Some(tenant_b.tenant_id), "menu update for tenant B");
    demo_mutation(&resolver, &scope, None, "global, untargeted write");

    // ------------------------------------------------------------------
    // Stop impersonating, sign out
    // ------------------------------------------------------------------
    let return_url = impersonation.stop().await?;
    tracing::info!(?return_url, "Impersonation ended");

    machine.sign_out();
    impersonation.clear_on_sign_out();
    wait_for(&mut snapshots, AuthState::Unauthenticated).await;

    // ------------------------------------------------------------------
    // Dump the audit trail
    // ------------------------------------------------------------------
    audit_sink.wait_for(3).await;
    for entry in audit_sink.entries() {
        tracing::info!(
            action = %entry.action,
            actor = ?entry.actor_user_id,
            tenant = ?entry.tenant_id,
            "audit"
        );
    }

    machine.close();
    Ok(())
}

/// Validate one mutation target and report the decision
fn demo_mutation(
    resolver: &ScopeResolver<MemoryAuditSink>,
    scope: &tenancy::TenantScope,
    target: Option<TenantId>,
    label: &str,
) {
    match resolver.validate_tenant_mutation(scope, target.as_ref()) {
        Ok(()) => tracing::info!(label, "Mutation allowed"),
        Err(TenancyError::CrossTenantMutationRejected { target, effective }) => {
            tracing::warn!(label, %target, ?effective, "Mutation rejected")
        }
        Err(e) => tracing::error!(label, error = %e, "Unexpected validation error"),
    }
}

/// Block until the machine reports the given state, logging transitions
async fn wait_for(rx: &mut watch::Receiver<AuthSnapshot>, state: AuthState) -> AuthSnapshot {
    loop {
        {
            let snapshot = rx.borrow_and_update();
            tracing::info!(state = %snapshot.state, "Auth transition");
            if snapshot.state == state {
                return snapshot.clone();
            }
        }
        rx.changed().await.expect("auth machine dropped");
    }
}
