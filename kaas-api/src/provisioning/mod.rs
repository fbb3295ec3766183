//! Workload provisioning
//!
//! Request -> normalized spec -> composed descriptors -> ordered submission.
//! Requests for the same name are serialized by [`locks::NameLocks`].

pub mod compose;
pub mod locks;
pub mod spec;
pub mod submit;

use std::sync::Arc;

use kaas_common::{CreateApplicationRequest, CreateDatabaseServiceRequest};
use tracing::{info, warn};

use crate::config::KaasConfig;
use crate::kubernetes::ClusterApi;
use crate::ledger::HealthLedger;
use crate::validation::{normalize_application, normalize_database_service};

pub use compose::{Composer, Resource, ResourceDescriptor, ResourceKind, ResourceRef};
pub use locks::NameLocks;
pub use submit::{submit, verify_order, ProvisioningError};

/// Provisions applications and managed PostgreSQL services into one namespace
pub struct Provisioner {
    cluster: Arc<dyn ClusterApi>,
    ledger: HealthLedger,
    composer: Composer,
    locks: NameLocks,
}

impl Provisioner {
    pub fn new(config: &KaasConfig, cluster: Arc<dyn ClusterApi>, ledger: HealthLedger) -> Self {
        Self {
            cluster,
            ledger,
            composer: Composer::new(
                config.kubernetes.namespace.clone(),
                config.probe.clone(),
                config.postgres.clone(),
            ),
            locks: NameLocks::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        self.composer.namespace()
    }

    pub async fn provision_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<Vec<ResourceRef>, ProvisioningError> {
        let spec = normalize_application(request)?;
        let _guard = self.locks.acquire(&self.lock_key(&spec.name)).await;

        info!(
            app_name = %spec.name,
            namespace = self.namespace(),
            replicas = spec.replicas,
            monitoring = spec.monitoring_enabled,
            "Provisioning application"
        );

        let descriptors = self.composer.compose_application(&spec);

        if spec.monitoring_enabled {
            if let Err(e) = self.ledger.ensure_table().await {
                warn!(app_name = %spec.name, error = %e, "Could not ensure health table, continuing");
            }
        }

        submit(self.cluster.as_ref(), self.namespace(), &descriptors).await
    }

    pub async fn provision_database_service(
        &self,
        request: &CreateDatabaseServiceRequest,
    ) -> Result<Vec<ResourceRef>, ProvisioningError> {
        let spec = normalize_database_service(request)?;
        let _guard = self.locks.acquire(&self.lock_key(&spec.name)).await;

        info!(
            app_name = %spec.name,
            namespace = self.namespace(),
            external = spec.external_access,
            "Provisioning PostgreSQL service"
        );

        let descriptors = self.composer.compose_database_service(&spec);
        submit(self.cluster.as_ref(), self.namespace(), &descriptors).await
    }

    fn lock_key(&self, name: &str) -> String {
        format!("{}/{}", self.namespace(), name)
    }
}
