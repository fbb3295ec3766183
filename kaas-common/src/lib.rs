//! Common types shared between the kaas API server and the health probe

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environment variable as submitted with an application request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvVar {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "IsSecret", default)]
    pub is_secret: bool,
}

fn default_replicas() -> i32 {
    1
}

/// Request body for `POST /applications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplicationRequest {
    #[serde(rename = "AppName")]
    pub app_name: String,
    #[serde(rename = "Replicas", default = "default_replicas")]
    pub replicas: i32,
    #[serde(rename = "ImageAddress")]
    pub image_address: String,
    #[serde(rename = "ImageTag")]
    pub image_tag: String,
    #[serde(rename = "DomainAddress", default)]
    pub domain_address: Option<String>,
    #[serde(rename = "ServicePort")]
    pub service_port: i64,
    /// Free-form resource map; must carry a cpu and a memory (or RAM) entry
    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, String>,
    #[serde(rename = "Envs", default)]
    pub envs: Vec<EnvVar>,
    #[serde(rename = "Monitoring", default)]
    pub monitoring: bool,
}

/// Request body for `POST /postgres`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseServiceRequest {
    #[serde(rename = "AppName")]
    pub app_name: String,
    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, String>,
    #[serde(rename = "External", default)]
    pub external: bool,
}

/// `{"status": "..."}` acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub status: String,
}

impl StatusMessage {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// `{"error": "..."}` soft error body, returned with a 200
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Pod phase as reported by the cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(value: &str) -> Self {
        match value {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// State of a single pod belonging to a workload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceStatus {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Phase")]
    pub phase: PodPhase,
    #[serde(rename = "HostIP")]
    pub host_address: Option<String>,
    #[serde(rename = "PodIP")]
    pub instance_address: Option<String>,
    /// `MM/DD/YYYY, HH:MM:SS`
    #[serde(rename = "StartTime")]
    pub start_time: Option<String>,
}

/// Controller state joined with the state of its pods
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompositeStatus {
    #[serde(rename = "DeploymentName")]
    pub workload_name: String,
    #[serde(rename = "Replicas")]
    pub desired_replicas: i32,
    #[serde(rename = "ReadyReplicas")]
    pub ready_replicas: i32,
    #[serde(rename = "PodStatuses")]
    pub instances: Vec<InstanceStatus>,
}

/// One row of the `health_status` ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthRecord {
    pub app_name: String,
    pub failure_count: i32,
    pub success_count: i32,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /health/{app_name}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HealthReport {
    Record(HealthRecord),
    Missing { error: String },
    Unhealthy { status: String, details: String },
}

impl HealthReport {
    pub fn missing(app_name: &str) -> Self {
        HealthReport::Missing {
            error: format!("No health record found for {}", app_name),
        }
    }

    pub fn unhealthy(details: impl Into<String>) -> Self {
        HealthReport::Unhealthy {
            status: "unhealthy".to_string(),
            details: details.into(),
        }
    }
}

/// Errors shared across the workspace
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
