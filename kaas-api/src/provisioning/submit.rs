//! Ordered submission of composed resources
//!
//! Descriptors are created one at a time in ordinal order. The first failure
//! stops the run; objects already created stay in the cluster.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::kubernetes::{ClusterApi, K8sError};
use crate::provisioning::compose::{Resource, ResourceDescriptor, ResourceRef};

#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The request was rejected before composition
    #[error(transparent)]
    Validation(#[from] kaas_common::Error),

    /// The descriptor list is not a valid creation order; nothing was sent
    #[error("Descriptor {descriptor} (#{ordinal}) is out of order: {reason}")]
    InvalidOrder {
        descriptor: ResourceRef,
        ordinal: usize,
        reason: String,
    },

    /// A create call failed part way through the list
    #[error("Failed to create {failed} (#{ordinal}) after {} successful step(s): {source}", .submitted.len())]
    Step {
        failed: ResourceRef,
        ordinal: usize,
        submitted: Vec<ResourceRef>,
        #[source]
        source: K8sError,
    },
}

impl ProvisioningError {
    /// Refs created before the failure
    pub fn submitted(&self) -> &[ResourceRef] {
        match self {
            ProvisioningError::Validation(_) | ProvisioningError::InvalidOrder { .. } => &[],
            ProvisioningError::Step { submitted, .. } => submitted,
        }
    }

    pub fn failed(&self) -> Option<&ResourceRef> {
        match self {
            ProvisioningError::Validation(_) => None,
            ProvisioningError::InvalidOrder { descriptor, .. } => Some(descriptor),
            ProvisioningError::Step { failed, .. } => Some(failed),
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Validation(e) => ApiError::from(e),
            ProvisioningError::InvalidOrder { .. } => ApiError::Internal(err.to_string()),
            ProvisioningError::Step { .. } => ApiError::Provisioning(err.to_string()),
        }
    }
}

/// Check ordinals are consecutive and every dependency appears earlier
pub fn verify_order(descriptors: &[ResourceDescriptor]) -> Result<(), ProvisioningError> {
    let mut seen: HashSet<ResourceRef> = HashSet::new();

    for (position, descriptor) in descriptors.iter().enumerate() {
        let reference = descriptor.reference();

        if descriptor.ordinal != position {
            return Err(ProvisioningError::InvalidOrder {
                descriptor: reference,
                ordinal: descriptor.ordinal,
                reason: format!("expected ordinal {}", position),
            });
        }

        if let Some(missing) = descriptor.depends_on.iter().find(|d| !seen.contains(*d)) {
            return Err(ProvisioningError::InvalidOrder {
                descriptor: reference,
                ordinal: descriptor.ordinal,
                reason: format!("dependency {} is not created before it", missing),
            });
        }

        seen.insert(reference);
    }

    Ok(())
}

/// Create every descriptor in `namespace`, stopping at the first failure
pub async fn submit(
    cluster: &dyn ClusterApi,
    namespace: &str,
    descriptors: &[ResourceDescriptor],
) -> Result<Vec<ResourceRef>, ProvisioningError> {
    verify_order(descriptors)?;

    let mut submitted = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let reference = descriptor.reference();
        debug!(resource = %reference, ordinal = descriptor.ordinal, "Creating resource");

        if let Err(source) = create(cluster, namespace, &descriptor.resource).await {
            warn!(
                resource = %reference,
                ordinal = descriptor.ordinal,
                submitted = submitted.len(),
                error = %source,
                "Provisioning step failed"
            );
            return Err(ProvisioningError::Step {
                failed: reference,
                ordinal: descriptor.ordinal,
                submitted,
                source,
            });
        }

        submitted.push(reference);
    }

    info!(namespace, count = submitted.len(), "Provisioned resources");
    Ok(submitted)
}

async fn create(cluster: &dyn ClusterApi, namespace: &str, resource: &Resource) -> Result<(), K8sError> {
    match resource {
        Resource::Secret(secret) => cluster.create_secret(namespace, secret).await,
        Resource::ConfigMap(config_map) => cluster.create_config_map(namespace, config_map).await,
        Resource::Deployment(deployment) => cluster.create_deployment(namespace, deployment).await,
        Resource::StatefulSet(stateful_set) => cluster.create_stateful_set(namespace, stateful_set).await,
        Resource::Service(service) => cluster.create_service(namespace, service).await,
        Resource::Ingress(ingress) => cluster.create_ingress(namespace, ingress).await,
        Resource::ScheduledJob(cron_job) => cluster.create_cron_job(namespace, cron_job).await,
    }
}
