//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with the API server it talks to.

use kube::config::KubeConfigOptions;
use kube::{Client, Config};

use super::error::{K8sError, K8sResult};

/// Wrapper around kube-rs Client
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    api_server: String,
}

impl K8sClient {
    /// Create a client for the given kubeconfig context, or infer one
    /// (in-cluster service account first, then the local kubeconfig)
    pub async fn connect(context: Option<&str>) -> K8sResult<Self> {
        let config = match context {
            Some(context) => Config::from_kubeconfig(&KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            })
            .await
            .map_err(|e| {
                K8sError::InvalidKubeconfig(format!("Failed to load context '{}': {}", context, e))
            })?,
            None => Config::infer().await.map_err(|e| {
                K8sError::InvalidKubeconfig(format!("Failed to infer config: {}", e))
            })?,
        };

        Self::from_config(config)
    }

    fn from_config(config: Config) -> K8sResult<Self> {
        let api_server = config.cluster_url.to_string();

        let inner = Client::try_from(config)
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        Ok(Self { inner, api_server })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Get the API server version as `major.minor`
    pub async fn get_version(&self) -> K8sResult<String> {
        let version = self.inner.apiserver_version().await?;

        Ok(format!("{}.{}", version.major, version.minor))
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("api_server", &self.api_server)
            .finish()
    }
}
