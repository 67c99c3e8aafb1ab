use std::sync::Arc;

use pamsync_core::{AppError, AppResult};
use pamsync_domain::{
    Account, AccountAttribute, AccountFilter, AttributeChange, ChangeOp, Entitlement,
    EntitlementType, Group, GroupMembershipPatch, PermissionReconciler, SafeCatalog,
    SafeEntitlement, SafeLabel, SafePermissionFilter,
};
use tracing::{debug, info, warn};

use crate::gateway_ports::{CreateAccountInput, OutputSink, PamGateway};

mod accounts;
mod changes;
mod connection;
mod entitlements;

/// Application service implementing the connector commands.
#[derive(Clone)]
pub struct ConnectorService {
    gateway: Arc<dyn PamGateway>,
    catalog: Arc<SafeCatalog>,
}

impl ConnectorService {
    /// Creates a new connector service.
    #[must_use]
    pub fn new(gateway: Arc<dyn PamGateway>, catalog: Arc<SafeCatalog>) -> Self {
        for name in catalog.ambiguous_role_names() {
            warn!(
                role = %name,
                "safe role shares its rights set with an earlier role; both will match the same grants"
            );
        }

        Self { gateway, catalog }
    }

    fn reconciler(&self) -> PermissionReconciler<'_> {
        PermissionReconciler::new(&self.catalog)
    }
}
