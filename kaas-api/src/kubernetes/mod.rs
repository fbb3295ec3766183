//! Kubernetes integration
//!
//! - Client connection via in-cluster config or kubeconfig
//! - Workloads (Deployments, StatefulSets, CronJobs, Pods)
//! - Networking (Services, Ingress)
//! - Configuration (ConfigMaps, Secrets)
//!
//! The rest of the crate talks to the cluster through [`ClusterApi`] so that
//! provisioning and status logic can run against an in-memory cluster.

pub mod client;
pub mod error;

// Sub-modules for different resource types
pub mod config_storage;
pub mod networking;
pub mod workloads;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;

pub use client::K8sClient;
pub use error::{K8sError, K8sResult};

/// Cluster operations used by provisioning, status and readiness
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn create_secret(&self, namespace: &str, secret: &Secret) -> K8sResult<()>;

    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> K8sResult<()>;

    async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> K8sResult<()>;

    async fn create_stateful_set(&self, namespace: &str, stateful_set: &StatefulSet) -> K8sResult<()>;

    async fn create_service(&self, namespace: &str, service: &Service) -> K8sResult<()>;

    async fn create_ingress(&self, namespace: &str, ingress: &Ingress) -> K8sResult<()>;

    async fn create_cron_job(&self, namespace: &str, cron_job: &CronJob) -> K8sResult<()>;

    /// `Ok(None)` when the deployment does not exist
    async fn get_deployment(&self, namespace: &str, name: &str) -> K8sResult<Option<Deployment>>;

    /// `Ok(None)` when the StatefulSet does not exist
    async fn get_stateful_set(&self, namespace: &str, name: &str) -> K8sResult<Option<StatefulSet>>;

    async fn list_deployments(&self, namespace: &str) -> K8sResult<Vec<Deployment>>;

    async fn list_stateful_sets(&self, namespace: &str) -> K8sResult<Vec<StatefulSet>>;

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> K8sResult<Vec<Pod>>;

    /// API server version, doubles as a reachability check
    async fn server_version(&self) -> K8sResult<String>;
}

#[async_trait]
impl ClusterApi for K8sClient {
    async fn create_secret(&self, namespace: &str, secret: &Secret) -> K8sResult<()> {
        config_storage::secrets::create_secret(self, namespace, secret).await
    }

    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> K8sResult<()> {
        config_storage::configmaps::create_configmap(self, namespace, config_map).await
    }

    async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> K8sResult<()> {
        workloads::deployments::create_deployment(self, namespace, deployment).await
    }

    async fn create_stateful_set(&self, namespace: &str, stateful_set: &StatefulSet) -> K8sResult<()> {
        workloads::statefulsets::create_statefulset(self, namespace, stateful_set).await
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> K8sResult<()> {
        networking::services::create_service(self, namespace, service).await
    }

    async fn create_ingress(&self, namespace: &str, ingress: &Ingress) -> K8sResult<()> {
        networking::ingress::create_ingress(self, namespace, ingress).await
    }

    async fn create_cron_job(&self, namespace: &str, cron_job: &CronJob) -> K8sResult<()> {
        workloads::jobs::create_cronjob(self, namespace, cron_job).await
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> K8sResult<Option<Deployment>> {
        workloads::deployments::get_deployment(self, namespace, name).await
    }

    async fn get_stateful_set(&self, namespace: &str, name: &str) -> K8sResult<Option<StatefulSet>> {
        workloads::statefulsets::get_statefulset(self, namespace, name).await
    }

    async fn list_deployments(&self, namespace: &str) -> K8sResult<Vec<Deployment>> {
        workloads::deployments::list_deployments(self, namespace).await
    }

    async fn list_stateful_sets(&self, namespace: &str) -> K8sResult<Vec<StatefulSet>> {
        workloads::statefulsets::list_statefulsets(self, namespace).await
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> K8sResult<Vec<Pod>> {
        workloads::pods::list_pods(self, namespace, label_selector).await
    }

    async fn server_version(&self) -> K8sResult<String> {
        self.get_version().await
    }
}
