//! Pod operations
//!
//! Pods are only ever read here; they are matched to their workload by the
//! `app={name}` label.

use k8s_openapi::api::core::v1::Pod;
use kaas_common::{InstanceStatus, PodPhase};
use kube::api::{Api, ListParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Label key correlating a workload with its pods
pub const APP_LABEL: &str = "app";

/// Format of `InstanceStatus::start_time`
pub const START_TIME_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

/// Label selector matching the pods of workload `name`
pub fn app_selector(name: &str) -> String {
    format!("{}={}", APP_LABEL, name)
}

/// List pods in a namespace matching a label selector
pub async fn list_pods(
    client: &K8sClient,
    namespace: &str,
    label_selector: &str,
) -> K8sResult<Vec<Pod>> {
    let pods: Api<Pod> = Api::namespaced(client.inner().clone(), namespace);
    let pod_list = pods.list(&ListParams::default().labels(label_selector)).await?;

    Ok(pod_list.items)
}

/// Convert k8s Pod to InstanceStatus
pub fn pod_to_instance(pod: &Pod) -> InstanceStatus {
    let status = pod.status.as_ref();

    InstanceStatus {
        name: pod.metadata.name.clone().unwrap_or_default(),
        phase: status
            .and_then(|s| s.phase.as_deref())
            .map(PodPhase::from)
            .unwrap_or(PodPhase::Unknown),
        host_address: status.and_then(|s| s.host_ip.clone()),
        instance_address: status.and_then(|s| s.pod_ip.clone()),
        start_time: status
            .and_then(|s| s.start_time.as_ref())
            .map(|t| t.0.format(START_TIME_FORMAT).to_string()),
    }
}
