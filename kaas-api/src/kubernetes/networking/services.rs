//! Service operations

use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a new service
pub async fn create_service(client: &K8sClient, namespace: &str, service: &Service) -> K8sResult<()> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);
    services.create(&PostParams::default(), service).await?;

    Ok(())
}
