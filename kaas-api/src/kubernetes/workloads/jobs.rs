//! CronJob operations

use k8s_openapi::api::batch::v1::CronJob;
use kube::api::{Api, PostParams};

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;

/// Create a new CronJob
pub async fn create_cronjob(client: &K8sClient, namespace: &str, cronjob: &CronJob) -> K8sResult<()> {
    let cronjobs: Api<CronJob> = Api::namespaced(client.inner().clone(), namespace);
    cronjobs.create(&PostParams::default(), cronjob).await?;

    Ok(())
}
