//! Kubernetes error types and ApiError mapping

use crate::error::ApiError;
use thiserror::Error;

/// Kubernetes-specific errors
#[derive(Debug, Error)]
pub enum K8sError {
    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Invalid kubeconfig
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl K8sError {
    /// HTTP status reported by the API server, if the call got that far
    pub fn status_code(&self) -> Option<u16> {
        match self {
            K8sError::KubeError(kube::Error::Api(response)) => Some(response.code),
            _ => None,
        }
    }
}

impl From<K8sError> for ApiError {
    fn from(err: K8sError) -> Self {
        match err.status_code() {
            Some(403) => ApiError::Forbidden(err.to_string()),
            Some(404) => ApiError::NotFound(err.to_string()),
            Some(409) => ApiError::Conflict(err.to_string()),
            Some(422) => ApiError::ValidationError(err.to_string()),
            _ => match err {
                K8sError::KubeError(e) => ApiError::Internal(format!("Kubernetes error: {}", e)),
                K8sError::InvalidKubeconfig(msg) => ApiError::ServiceUnavailable(msg),
                K8sError::Internal(msg) => ApiError::Internal(msg),
            },
        }
    }
}

/// Result type alias for Kubernetes operations
pub type K8sResult<T> = std::result::Result<T, K8sError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16, reason: &str) -> K8sError {
        K8sError::KubeError(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} happened", reason),
            reason: reason.to_string(),
            code,
        }))
    }

    #[test]
    fn test_status_code() {
        assert_eq!(api_error(409, "AlreadyExists").status_code(), Some(409));
        assert_eq!(K8sError::Internal("x".to_string()).status_code(), None);
    }

    #[test]
    fn test_api_error_mapping() {
        let response = ApiError::from(api_error(409, "AlreadyExists")).to_error_response();
        assert_eq!(response.status, 409);

        let response = ApiError::from(api_error(500, "InternalError")).to_error_response();
        assert_eq!(response.status, 500);

        let response =
            ApiError::from(K8sError::InvalidKubeconfig("no context".to_string())).to_error_response();
        assert_eq!(response.status, 503);
    }
}
