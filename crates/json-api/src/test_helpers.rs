//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use testgenium_app::{
    auth::MockAuthService,
    context::AppContext,
    domain::{
        orchestrator::MockJobOrchestrator,
        tenants::{
            MockTenantsService,
            records::{PasswordHash, Plan, TenantRecord, TenantUuid, Usage},
        },
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_TENANT_UUID: TenantUuid = TenantUuid::from_uuid(Uuid::nil());

/// Service mocks behind the state. Mocks without expectations fail on any call.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) tenants: MockTenantsService,
    pub(crate) auth: MockAuthService,
    pub(crate) jobs: MockJobOrchestrator,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            tenants: Arc::new(self.tenants),
            auth: Arc::new(self.auth),
            jobs: Arc::new(self.jobs),
        })
    }
}

#[salvo::handler]
pub(crate) async fn inject_tenant(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_tenant_uuid(TEST_TENANT_UUID);
    ctrl.call_next(req, depot, res).await;
}

/// `route` behind injected state, without authentication.
pub(crate) fn public_service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(mocks.into_state())).push(route))
}

/// `route` behind injected state, as if [`TEST_TENANT_UUID`] had signed in.
pub(crate) fn tenant_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_tenant)
            .push(route),
    )
}

pub(crate) fn make_tenant(uuid: TenantUuid, plan: Plan) -> TenantRecord {
    TenantRecord {
        uuid,
        email: "demo@example.com".to_string(),
        password_hash: PasswordHash::new("$argon2id$v=19$m=19456,t=2,p=1$test".to_string()),
        company_name: "Example Ltd".to_string(),
        full_name: "Demo User".to_string(),
        phone: None,
        plan,
        limits: plan.default_limits(),
        usage: Usage::default(),
        is_active: true,
        email_verified: false,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
