//! Configuration management for the kaas API
//!
//! This module provides a centralized configuration system that loads settings from:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct for kaas
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KaasConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Cluster connection and target namespace
    pub kubernetes: KubernetesConfig,
    /// Health ledger database configuration
    pub database: DatabaseConfig,
    /// Scheduled health probe configuration
    pub probe: ProbeConfig,
    /// Managed PostgreSQL service settings
    pub postgres: ManagedPostgresConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Name of the deployment running this API, checked by `/ready`
    pub deployment_name: String,
}

/// Kubernetes configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Namespace new workloads are provisioned into
    pub namespace: String,
    /// Kubeconfig context; in-cluster or inferred configuration when unset
    pub context: Option<String>,
}

/// Database configuration for the health ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Write endpoint, used for table creation and upserts
    pub primary: DatabaseEndpoint,
    /// Read endpoint; reads go to the primary when unset
    pub replica: Option<DatabaseEndpoint>,
    /// Maximum number of connections in each pool
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

/// Connection parameters for one PostgreSQL endpoint
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseEndpoint {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Scheduled health probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Image that contains the `kaas-probe` binary
    pub image: String,
    /// Cron schedule of the probe job
    pub schedule: String,
    /// HTTP path probed on the application's service
    pub liveness_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Secret holding the `KAAS_DB_*` variables handed to the probe job
    pub credentials_secret: String,
}

/// Settings for `POST /postgres` workloads
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagedPostgresConfig {
    pub image: String,
    /// Administrative user written into each instance's secret
    pub admin_user: String,
    pub admin_password: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Emit console output as JSON
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            deployment_name: "kaas-api".to_string(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            context: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            primary: DatabaseEndpoint::default(),
            replica: None,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for DatabaseEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            image: "kaas/kaas-api:latest".to_string(),
            schedule: "*/5 * * * *".to_string(),
            liveness_path: "/healthz".to_string(),
            timeout_secs: 10,
            credentials_secret: "kaas-ledger-credentials".to_string(),
        }
    }
}

pub const DEFAULT_POSTGRES_ADMIN_PASSWORD: &str = "adminpass";

impl Default for ManagedPostgresConfig {
    fn default() -> Self {
        Self {
            image: "postgres:latest".to_string(),
            admin_user: "admin".to_string(),
            admin_password: DEFAULT_POSTGRES_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl ManagedPostgresConfig {
    pub fn uses_default_password(&self) -> bool {
        self.admin_password == DEFAULT_POSTGRES_ADMIN_PASSWORD
    }
}

impl std::fmt::Debug for ManagedPostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedPostgresConfig")
            .field("image", &self.image)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"[REDACTED]")
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json: false,
        }
    }
}

impl std::fmt::Debug for DatabaseEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl DatabaseEndpoint {
    /// Build sqlx connection options for this endpoint
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }

    /// Apply `{prefix}_HOST`, `{prefix}_PORT`, `{prefix}_NAME`, `{prefix}_USER`
    /// and `{prefix}_PASSWORD` overrides
    fn apply_env_overrides(&mut self, prefix: &str) -> bool {
        let mut touched = false;

        if let Ok(host) = std::env::var(format!("{}_HOST", prefix)) {
            self.host = host;
            touched = true;
        }
        if let Ok(port) = std::env::var(format!("{}_PORT", prefix)) {
            if let Ok(port) = port.parse() {
                self.port = port;
                touched = true;
            }
        }
        if let Ok(name) = std::env::var(format!("{}_NAME", prefix)) {
            self.name = name;
            touched = true;
        }
        if let Ok(user) = std::env::var(format!("{}_USER", prefix)) {
            self.user = user;
            touched = true;
        }
        if let Ok(password) = std::env::var(format!("{}_PASSWORD", prefix)) {
            self.password = password;
            touched = true;
        }

        touched
    }
}

impl DatabaseConfig {
    /// Endpoint used for reads
    pub fn read_endpoint(&self) -> &DatabaseEndpoint {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl KaasConfig {
    /// Load configuration from environment variables and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.clone(), e.to_string()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("KAAS_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/kaas/config.toml")),
            Some(PathBuf::from("./kaas.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server
        if let Ok(host) = std::env::var("KAAS_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("KAAS_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(name) = std::env::var("KAAS_DEPLOYMENT_NAME") {
            self.server.deployment_name = name;
        }

        // Kubernetes
        if let Ok(namespace) = std::env::var("KAAS_NAMESPACE") {
            self.kubernetes.namespace = namespace;
        }
        if let Ok(context) = std::env::var("KAAS_KUBE_CONTEXT") {
            self.kubernetes.context = Some(context);
        }

        // Database
        self.database.primary.apply_env_overrides("KAAS_DB");

        let mut replica = self.database.replica.clone().unwrap_or_default();
        if replica.apply_env_overrides("KAAS_DB_REPLICA") {
            self.database.replica = Some(replica);
        }
        if let Ok(max) = std::env::var("KAAS_DB_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                self.database.max_connections = max;
            }
        }

        // Probe
        if let Ok(image) = std::env::var("KAAS_PROBE_IMAGE") {
            self.probe.image = image;
        }
        if let Ok(schedule) = std::env::var("KAAS_PROBE_SCHEDULE") {
            self.probe.schedule = schedule;
        }
        if let Ok(path) = std::env::var("KAAS_PROBE_PATH") {
            self.probe.liveness_path = path;
        }
        if let Ok(secs) = std::env::var("KAAS_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.probe.timeout_secs = secs;
            }
        }
        if let Ok(secret) = std::env::var("KAAS_PROBE_CREDENTIALS_SECRET") {
            self.probe.credentials_secret = secret;
        }

        // Managed PostgreSQL
        if let Ok(image) = std::env::var("KAAS_POSTGRES_IMAGE") {
            self.postgres.image = image;
        }
        if let Ok(user) = std::env::var("KAAS_POSTGRES_ADMIN_USER") {
            self.postgres.admin_user = user;
        }
        if let Ok(password) = std::env::var("KAAS_POSTGRES_ADMIN_PASSWORD") {
            self.postgres.admin_password = password;
        }

        // Logging
        if let Ok(level) = std::env::var("KAAS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(dir) = std::env::var("KAAS_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }
        if let Ok(json) = std::env::var("KAAS_LOG_JSON") {
            self.logging.json = json.parse().unwrap_or(false);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        if self.kubernetes.namespace.is_empty() {
            return Err(ConfigError::Validation("Namespace cannot be empty".to_string()));
        }

        if self.database.primary.host.is_empty() {
            return Err(ConfigError::Validation("Database host cannot be empty".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "Database max_connections must be at least 1".to_string(),
            ));
        }

        if !self.probe.liveness_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Probe liveness path must start with '/'".to_string(),
            ));
        }

        if self.probe.schedule.split_whitespace().count() != 5 {
            return Err(ConfigError::Validation(
                "Probe schedule must be a five-field cron expression".to_string(),
            ));
        }

        if self.postgres.admin_user.is_empty() || self.postgres.admin_password.is_empty() {
            return Err(ConfigError::Validation(
                "Managed PostgreSQL admin credentials cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// Configuration validation failed
    #[error("Config validation failed: {0}")]
    Validation(String),
}
