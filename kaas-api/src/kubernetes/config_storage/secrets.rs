//! Secret operations

use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a new Secret
pub async fn create_secret(client: &K8sClient, namespace: &str, secret: &Secret) -> K8sResult<()> {
    let secrets: Api<Secret> = Api::namespaced(client.inner().clone(), namespace);
    secrets.create(&PostParams::default(), secret).await?;

    Ok(())
}
