//! Application State
//!
//! Shared state for the kaas API server

use std::sync::Arc;

use crate::config::KaasConfig;
use crate::health::HealthChecker;
use crate::kubernetes::ClusterApi;
use crate::ledger::HealthLedger;
use crate::provisioning::Provisioner;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cluster: Arc<dyn ClusterApi>,
    pub ledger: HealthLedger,
    pub provisioner: Arc<Provisioner>,
    pub health: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(config: &KaasConfig, cluster: Arc<dyn ClusterApi>, ledger: HealthLedger) -> Self {
        let provisioner = Provisioner::new(config, cluster.clone(), ledger.clone());
        let health = HealthChecker::new(&config.kubernetes.namespace, &config.server.deployment_name);

        Self {
            cluster,
            ledger,
            provisioner: Arc::new(provisioner),
            health: Arc::new(health),
        }
    }
}
