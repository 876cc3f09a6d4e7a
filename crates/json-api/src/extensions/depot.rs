//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use testgenium_app::domain::tenants::records::TenantUuid;

use crate::errors::ApiError;

const TENANT_UUID_KEY: &str = "tenant_uuid";

/// Typed access to values the middleware stack leaves in the depot.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_tenant_uuid(&mut self, tenant: TenantUuid);

    /// The caller's verified tenant; absent only when a route skipped auth.
    fn tenant_uuid_or_401(&self) -> Result<TenantUuid, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>().map_err(|_missing| ApiError::internal())
    }

    fn insert_tenant_uuid(&mut self, tenant: TenantUuid) {
        self.insert(TENANT_UUID_KEY, tenant);
    }

    fn tenant_uuid_or_401(&self) -> Result<TenantUuid, ApiError> {
        self.get::<TenantUuid>(TENANT_UUID_KEY)
            .copied()
            .map_err(|_missing| ApiError::token_missing())
    }
}
