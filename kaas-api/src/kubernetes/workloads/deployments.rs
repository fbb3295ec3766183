//! Deployment operations

use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, ListParams, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a deployment
pub async fn create_deployment(
    client: &K8sClient,
    namespace: &str,
    deployment: &Deployment,
) -> K8sResult<()> {
    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);
    deployments.create(&PostParams::default(), deployment).await?;

    Ok(())
}

/// Get a single deployment, `None` when it does not exist
pub async fn get_deployment(
    client: &K8sClient,
    namespace: &str,
    name: &str,
) -> K8sResult<Option<Deployment>> {
    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);

    Ok(deployments.get_opt(name).await?)
}

/// List deployments in a namespace
pub async fn list_deployments(client: &K8sClient, namespace: &str) -> K8sResult<Vec<Deployment>> {
    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);
    let list = deployments.list(&ListParams::default()).await?;

    Ok(list.items)
}

/// Desired and ready replica counts of a deployment
pub fn deployment_replicas(deployment: &Deployment) -> (i32, i32) {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let ready = deployment
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);

    (desired, ready)
}
