//! Ingress operations

use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a new Ingress
pub async fn create_ingress(client: &K8sClient, namespace: &str, ingress: &Ingress) -> K8sResult<()> {
    let ingresses: Api<Ingress> = Api::namespaced(client.inner().clone(), namespace);
    ingresses.create(&PostParams::default(), ingress).await?;

    Ok(())
}
