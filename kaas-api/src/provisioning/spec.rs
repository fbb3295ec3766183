//! Normalized provisioning intents
//!
//! Built from request bodies by [`crate::validation`]; every name derived
//! downstream comes from `name`.

/// Resource requests applied to the workload's container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequests {
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
    pub is_secret: bool,
}

/// A validated application request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSpec {
    pub name: String,
    pub replicas: i32,
    /// `{repository}:{tag}`
    pub image: String,
    pub service_port: i32,
    pub domain: Option<String>,
    pub resources: ResourceRequests,
    pub env: Vec<EnvironmentVariable>,
    pub monitoring_enabled: bool,
}

impl AppSpec {
    pub fn has_secrets(&self) -> bool {
        self.env.iter().any(|e| e.is_secret)
    }

    pub fn plain_env(&self) -> impl Iterator<Item = &EnvironmentVariable> {
        self.env.iter().filter(|e| !e.is_secret)
    }

    pub fn secret_env(&self) -> impl Iterator<Item = &EnvironmentVariable> {
        self.env.iter().filter(|e| e.is_secret)
    }
}

/// A validated managed PostgreSQL request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseServiceSpec {
    pub name: String,
    pub resources: ResourceRequests,
    pub external_access: bool,
}
