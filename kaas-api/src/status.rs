//! Composite workload status
//!
//! Joins a Deployment or StatefulSet with the pods carrying its `app` label.

use kaas_common::{CompositeStatus, ErrorMessage};

use crate::kubernetes::workloads::deployments::deployment_replicas;
use crate::kubernetes::workloads::pods::{app_selector, pod_to_instance};
use crate::kubernetes::workloads::statefulsets::statefulset_replicas;
use crate::kubernetes::{ClusterApi, K8sResult};

/// Result of looking up a single workload
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLookup {
    Found(CompositeStatus),
    NotFound { namespace: String, name: String },
}

impl StatusLookup {
    /// Soft not-found body returned with a 200
    pub fn not_found_message(namespace: &str, name: &str) -> ErrorMessage {
        ErrorMessage::new(format!(
            "Deployment {} not found in namespace {}",
            name, namespace
        ))
    }
}

/// Status of workload `name`, looking at Deployments first, then StatefulSets
pub async fn status_of(cluster: &dyn ClusterApi, namespace: &str, name: &str) -> K8sResult<StatusLookup> {
    let replicas = match cluster.get_deployment(namespace, name).await? {
        Some(deployment) => deployment_replicas(&deployment),
        None => match cluster.get_stateful_set(namespace, name).await? {
            Some(stateful_set) => statefulset_replicas(&stateful_set),
            None => {
                return Ok(StatusLookup::NotFound {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
        },
    };

    let status = composite(cluster, namespace, name, replicas).await?;
    Ok(StatusLookup::Found(status))
}

/// Status of every Deployment then every StatefulSet in `namespace`, in the
/// order the cluster lists them
pub async fn status_of_all(cluster: &dyn ClusterApi, namespace: &str) -> K8sResult<Vec<CompositeStatus>> {
    let mut workloads: Vec<(String, (i32, i32))> = Vec::new();

    for deployment in cluster.list_deployments(namespace).await? {
        let name = deployment.metadata.name.clone().unwrap_or_default();
        workloads.push((name, deployment_replicas(&deployment)));
    }

    for stateful_set in cluster.list_stateful_sets(namespace).await? {
        let name = stateful_set.metadata.name.clone().unwrap_or_default();
        workloads.push((name, statefulset_replicas(&stateful_set)));
    }

    let mut statuses = Vec::with_capacity(workloads.len());
    for (name, replicas) in workloads {
        statuses.push(composite(cluster, namespace, &name, replicas).await?);
    }

    Ok(statuses)
}

async fn composite(
    cluster: &dyn ClusterApi,
    namespace: &str,
    name: &str,
    (desired_replicas, ready_replicas): (i32, i32),
) -> K8sResult<CompositeStatus> {
    let pods = cluster.list_pods(namespace, &app_selector(name)).await?;

    Ok(CompositeStatus {
        workload_name: name.to_string(),
        desired_replicas,
        ready_replicas,
        instances: pods.iter().map(pod_to_instance).collect(),
    })
}
