//! ConfigMap operations

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a new ConfigMap
pub async fn create_configmap(
    client: &K8sClient,
    namespace: &str,
    configmap: &ConfigMap,
) -> K8sResult<()> {
    let configmaps: Api<ConfigMap> = Api::namespaced(client.inner().clone(), namespace);
    configmaps.create(&PostParams::default(), configmap).await?;

    Ok(())
}
