//! Kubernetes configuration resources

pub mod configmaps;
pub mod secrets;
