//! Liveness, readiness and startup probes for the API's own deployment
//!
//! - Liveness: the process is serving requests
//! - Readiness: the API's own Deployment exists with at least one replica
//! - Startup: the cluster API answers a version request

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::kubernetes::ClusterApi;

/// Component health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of checking one dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub latency_ms: Option<u64>,
}

impl ComponentHealth {
    fn healthy(name: &str, message: String, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message: Some(message),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    fn unhealthy(name: &str, message: String, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(message),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Health checker for the API process
pub struct HealthChecker {
    namespace: String,
    deployment_name: String,
}

impl HealthChecker {
    pub fn new(namespace: &str, deployment_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            deployment_name: deployment_name.to_string(),
        }
    }

    /// Ready when the API's own Deployment is present and explicitly asks
    /// for at least one replica
    pub async fn readiness(&self, cluster: &dyn ClusterApi) -> ComponentHealth {
        let start = Instant::now();

        match cluster.get_deployment(&self.namespace, &self.deployment_name).await {
            Ok(Some(deployment)) => {
                let desired = deployment.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);
                if desired >= 1 {
                    ComponentHealth::healthy(
                        "deployment",
                        format!("{} replica(s) requested", desired),
                        start,
                    )
                } else {
                    ComponentHealth::unhealthy(
                        "deployment",
                        "Application is not ready yet".to_string(),
                        start,
                    )
                }
            }
            Ok(None) => ComponentHealth::unhealthy(
                "deployment",
                format!(
                    "Deployment {} not found in namespace {}",
                    self.deployment_name, self.namespace
                ),
                start,
            ),
            Err(e) => ComponentHealth::unhealthy("deployment", e.to_string(), start),
        }
    }

    /// Cluster API reachability
    pub async fn startup(&self, cluster: &dyn ClusterApi) -> ComponentHealth {
        let start = Instant::now();

        match cluster.server_version().await {
            Ok(version) => ComponentHealth::healthy(
                "cluster",
                format!("Kubernetes {}", version),
                start,
            ),
            Err(e) => ComponentHealth::unhealthy(
                "cluster",
                format!("Cluster API unreachable: {}", e),
                start,
            ),
        }
    }
}
