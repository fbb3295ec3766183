//! Kubernetes networking resources

pub mod ingress;
pub mod services;
