//! Common test utilities and helpers

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStatus, StatefulSet, StatefulSetSpec, StatefulSetStatus};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, PodStatus, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kaas_api::config::KaasConfig;
use kaas_api::kubernetes::{ClusterApi, K8sError, K8sResult};
use kaas_api::ledger::HealthLedger;

pub const NAMESPACE: &str = "apps";

/// Configuration pointing at namespace `apps` and a ledger nobody listens on
pub fn test_config() -> KaasConfig {
    let mut config = KaasConfig::default();
    config.kubernetes.namespace = NAMESPACE.to_string();
    config.database.primary.host = "127.0.0.1".to_string();
    config.database.primary.port = 1;
    config.database.acquire_timeout_secs = 1;
    config
}

/// Ledger whose every call fails with a connection error
pub fn unreachable_ledger() -> HealthLedger {
    HealthLedger::connect(&test_config().database)
}

fn metadata(namespace: &str, name: &str, labels: Option<BTreeMap<String, String>>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels,
        ..Default::default()
    }
}

pub fn deployment(name: &str, replicas: Option<i32>, ready: Option<i32>) -> Deployment {
    Deployment {
        metadata: metadata(NAMESPACE, name, None),
        spec: Some(DeploymentSpec {
            replicas,
            ..Default::default()
        }),
        status: Some(DeploymentStatus {
            ready_replicas: ready,
            ..Default::default()
        }),
    }
}

pub fn stateful_set(name: &str, replicas: i32, ready: i32) -> StatefulSet {
    StatefulSet {
        metadata: metadata(NAMESPACE, name, None),
        spec: Some(StatefulSetSpec {
            replicas: Some(replicas),
            ..Default::default()
        }),
        status: Some(StatefulSetStatus {
            ready_replicas: Some(ready),
            ..Default::default()
        }),
    }
}

pub fn pod(name: &str, app: &str, phase: &str) -> Pod {
    Pod {
        metadata: metadata(
            NAMESPACE,
            name,
            Some(BTreeMap::from([("app".to_string(), app.to_string())])),
        ),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            host_ip: Some("10.0.0.1".to_string()),
            pod_ip: Some("10.244.0.2".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[derive(Default)]
struct Objects {
    deployments: Vec<Deployment>,
    stateful_sets: Vec<StatefulSet>,
    pods: Vec<Pod>,
}

/// In-memory cluster recording every create call as `Kind/name`
#[derive(Default)]
pub struct FakeCluster {
    created: Mutex<Vec<String>>,
    objects: Mutex<Objects>,
    /// Index of the create call that fails with a 409
    fail_at: Option<usize>,
    unreachable: bool,
    /// Sleep before every create so concurrent runs can interleave
    create_delay: Option<Duration>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn with_deployment(self, deployment: Deployment) -> Self {
        self.objects.lock().unwrap().deployments.push(deployment);
        self
    }

    pub fn with_stateful_set(self, stateful_set: StatefulSet) -> Self {
        self.objects.lock().unwrap().stateful_sets.push(stateful_set);
        self
    }

    pub fn with_pod(self, pod: Pod) -> Self {
        self.objects.lock().unwrap().pods.push(pod);
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// `Kind/name` of every successful create, in call order
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> K8sResult<()> {
        if self.unreachable {
            return Err(K8sError::Internal("connection refused".to_string()));
        }
        Ok(())
    }

    async fn record(&self, kind: &str, metadata: &ObjectMeta) -> K8sResult<()> {
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_reachable()?;

        let mut created = self.created.lock().unwrap();
        let name = metadata.name.clone().unwrap_or_default();

        if self.fail_at == Some(created.len()) {
            return Err(K8sError::KubeError(kube::Error::Api(kube::core::ErrorResponse {
                status: "Failure".to_string(),
                message: format!("{} \"{}\" already exists", kind, name),
                reason: "AlreadyExists".to_string(),
                code: 409,
            })));
        }

        created.push(format!("{}/{}", kind, name));
        Ok(())
    }
}

fn in_namespace(metadata: &ObjectMeta, namespace: &str) -> bool {
    metadata.namespace.as_deref() == Some(namespace)
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn create_secret(&self, _namespace: &str, secret: &Secret) -> K8sResult<()> {
        self.record("Secret", &secret.metadata).await
    }

    async fn create_config_map(&self, _namespace: &str, config_map: &ConfigMap) -> K8sResult<()> {
        self.record("ConfigMap", &config_map.metadata).await
    }

    async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> K8sResult<()> {
        self.record("Deployment", &deployment.metadata).await?;

        let mut stored = deployment.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        self.objects.lock().unwrap().deployments.push(stored);
        Ok(())
    }

    async fn create_stateful_set(&self, namespace: &str, stateful_set: &StatefulSet) -> K8sResult<()> {
        self.record("StatefulSet", &stateful_set.metadata).await?;

        let mut stored = stateful_set.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        self.objects.lock().unwrap().stateful_sets.push(stored);
        Ok(())
    }

    async fn create_service(&self, _namespace: &str, service: &Service) -> K8sResult<()> {
        self.record("Service", &service.metadata).await
    }

    async fn create_ingress(&self, _namespace: &str, ingress: &Ingress) -> K8sResult<()> {
        self.record("Ingress", &ingress.metadata).await
    }

    async fn create_cron_job(&self, _namespace: &str, cron_job: &CronJob) -> K8sResult<()> {
        self.record("CronJob", &cron_job.metadata).await
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> K8sResult<Option<Deployment>> {
        self.check_reachable()?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .deployments
            .iter()
            .find(|d| in_namespace(&d.metadata, namespace) && d.metadata.name.as_deref() == Some(name))
            .cloned())
    }

    async fn get_stateful_set(&self, namespace: &str, name: &str) -> K8sResult<Option<StatefulSet>> {
        self.check_reachable()?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .stateful_sets
            .iter()
            .find(|s| in_namespace(&s.metadata, namespace) && s.metadata.name.as_deref() == Some(name))
            .cloned())
    }

    async fn list_deployments(&self, namespace: &str) -> K8sResult<Vec<Deployment>> {
        self.check_reachable()?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .deployments
            .iter()
            .filter(|d| in_namespace(&d.metadata, namespace))
            .cloned()
            .collect())
    }

    async fn list_stateful_sets(&self, namespace: &str) -> K8sResult<Vec<StatefulSet>> {
        self.check_reachable()?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .stateful_sets
            .iter()
            .filter(|s| in_namespace(&s.metadata, namespace))
            .cloned()
            .collect())
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> K8sResult<Vec<Pod>> {
        self.check_reachable()?;

        let (key, value) = label_selector
            .split_once('=')
            .ok_or_else(|| K8sError::Internal(format!("bad selector {}", label_selector)))?;

        Ok(self
            .objects
            .lock()
            .unwrap()
            .pods
            .iter()
            .filter(|p| in_namespace(&p.metadata, namespace))
            .filter(|p| {
                p.metadata
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get(key))
                    .map(String::as_str)
                    == Some(value)
            })
            .cloned()
            .collect())
    }

    async fn server_version(&self) -> K8sResult<String> {
        self.check_reachable()?;
        Ok("1.32".to_string())
    }
}
