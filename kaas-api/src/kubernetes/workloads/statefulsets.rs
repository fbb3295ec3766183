//! StatefulSet operations

use k8s_openapi::api::apps::v1::StatefulSet;
use kube::api::{Api, ListParams, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a StatefulSet
pub async fn create_statefulset(
    client: &K8sClient,
    namespace: &str,
    statefulset: &StatefulSet,
) -> K8sResult<()> {
    let statefulsets: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    statefulsets.create(&PostParams::default(), statefulset).await?;

    Ok(())
}

/// Get a specific StatefulSet, `None` when it does not exist
pub async fn get_statefulset(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<Option<StatefulSet>> {
    let statefulsets: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);

    Ok(statefulsets.get_opt(name).await?)
}

/// List StatefulSets in a namespace
pub async fn list_statefulsets(
    client: &K8sClient,
    namespace: &str,
) -> K8sResult<Vec<StatefulSet>> {
    let statefulsets: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    let list = statefulsets.list(&ListParams::default()).await?;

    Ok(list.items)
}

/// Desired and ready replica counts of a StatefulSet
pub fn statefulset_replicas(statefulset: &StatefulSet) -> (i32, i32) {
    let desired = statefulset
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let ready = statefulset
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);

    (desired, ready)
}
